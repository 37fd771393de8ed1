//! Three participants promote their preferred masters while promotion is
//! slower than the configured SLAVE-MASTER timeout. Every preferred master
//! lands in ERROR; each node then prints its state report.
//!
//! Run with `RUST_LOG=partition_transit=debug` to see the executor's spans.

use partition_transit::builder::{master_slave, noop_transition, TransitionBuilder};
use partition_transit::{
    MasterSlaveState, PartitionId, State, StateModelFactory, TimeoutConfig, TimeoutResolver,
    TransitionExecutor, TransitionId, TransitionMessage,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use MasterSlaveState::{Master, Offline, Slave};

const NODES: usize = 3;
const PARTITIONS: usize = 3;

fn partition(index: usize) -> PartitionId {
    PartitionId::new("TestDB", format!("TestDB_{index}"))
}

fn participant(
    node: usize,
    resolver: Arc<TimeoutResolver>,
) -> Result<TransitionExecutor<MasterSlaveState>, Box<dyn std::error::Error>> {
    let definition = master_slave()
        .add_transition(noop_transition(Offline, Slave))
        .add_transition(noop_transition(Master, Slave))
        .add_transition(noop_transition(Slave, Offline))
        .transition(TransitionBuilder::new().from(Slave).to(Master).action(
            move |_message, ctx| async move {
                info!(partition = %ctx.partition(), deadline = %ctx.deadline(), "Becoming MASTER");
                if ctx.partition() == &partition(node) {
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(1000)) => {}
                        _ = ctx.cancelled() => warn!(partition = %ctx.partition(), "Promotion abandoned"),
                    }
                }
                Ok(())
            },
        ))?
        .reset_from_error()
        .build()?;

    Ok(TransitionExecutor::new(
        Arc::new(StateModelFactory::new(Arc::new(definition))),
        resolver,
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let slave_master = TransitionId::of(&Slave, &Master);
    let resolver = Arc::new(TimeoutResolver::new(
        TimeoutConfig::new()
            .with_cluster_timeout(&slave_master, 300)
            .with_resource_timeout("TestDB", &slave_master, 200),
    ));

    let nodes = (0..NODES)
        .map(|node| participant(node, Arc::clone(&resolver)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut handles = Vec::new();
    for executor in &nodes {
        for p in 0..PARTITIONS {
            handles.push(executor.submit(TransitionMessage::new(partition(p), Offline, Slave))?);
        }
    }
    for handle in handles {
        handle.wait().await?;
    }

    let mut handles = Vec::new();
    for (node, executor) in nodes.iter().enumerate() {
        handles.push(executor.submit(TransitionMessage::new(partition(node), Slave, Master))?);
    }
    for handle in handles {
        let report = handle.wait().await?;
        info!(
            partition = %report.partition,
            state = report.state.name(),
            error = ?report.error_kind(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Promotion finished"
        );
    }

    for (node, executor) in nodes.iter().enumerate() {
        let report = executor.factory().report(format!("localhost_{}", 12918 + node));
        println!("{}", report.to_json()?);
    }

    Ok(())
}
