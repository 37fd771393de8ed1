//! Transition execution.
//!
//! The [`TransitionExecutor`] takes a [`TransitionMessage`](crate::TransitionMessage),
//! resolves its deadline, runs the bound handler on its own task and races it
//! against the deadline. Success moves the replica to the target state;
//! a timeout, a handler error or a framework problem forces the replica into
//! the error state and notifies the rollback notifier once.
//!
//! # Example
//!
//! ```rust
//! use partition_transit::builder::{master_slave, TransitionBuilder};
//! use partition_transit::core::{MasterSlaveState, PartitionId, TransitionId};
//! use partition_transit::rollback::ErrorKind;
//! use partition_transit::timeout::{TimeoutConfig, TimeoutResolver};
//! use partition_transit::{StateModelFactory, TransitionExecutor, TransitionMessage};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let definition = master_slave()
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(MasterSlaveState::Offline)
//!             .to(MasterSlaveState::Slave)
//!             .action(|_message, ctx| async move {
//!                 // Slow bootstrap that gives up once the deadline passes.
//!                 tokio::select! {
//!                     _ = tokio::time::sleep(Duration::from_secs(5)) => Ok(()),
//!                     _ = ctx.cancelled() => Err(partition_transit::HandlerError::Cancelled),
//!                 }
//!             }),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let resolver = TimeoutResolver::new(
//!     TimeoutConfig::new().with_cluster_timeout(&TransitionId::new("OFFLINE", "SLAVE"), 20),
//! );
//! let executor = TransitionExecutor::new(
//!     Arc::new(StateModelFactory::new(Arc::new(definition))),
//!     Arc::new(resolver),
//! );
//!
//! let partition = PartitionId::new("TestDB", "TestDB_0");
//! let report = executor
//!     .execute(TransitionMessage::new(
//!         partition.clone(),
//!         MasterSlaveState::Offline,
//!         MasterSlaveState::Slave,
//!     ))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(report.state, MasterSlaveState::Error);
//! assert_eq!(report.error_kind(), Some(ErrorKind::Timeout));
//! assert_eq!(executor.factory().get(&partition).unwrap().error_count(), 1);
//! # }
//! ```

mod config;
mod engine;
pub mod handler;
mod report;

pub use config::ExecutorConfig;
pub use engine::{TransitionExecutor, TransitionHandle};
pub use handler::{HandlerError, HandlerFuture, TransitionContext, TransitionHandler};
pub use report::{TransitionListener, TransitionReport};
