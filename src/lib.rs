//! Partition Transit: timeout-aware state transitions for partitioned replicas
//!
//! A node in a partitioned cluster hosts replicas of many partitions. The
//! controller moves each replica through a state model (OFFLINE, SLAVE,
//! MASTER and so on) by sending transition messages. This crate executes
//! those messages: it finds the handler for each transition, runs it under a
//! deadline resolved from layered configuration, and applies the outcome.
//!
//! # Core Concepts
//!
//! - **State model**: declared states, an initial and an error state, and a
//!   handler per allowed transition, validated once at `build()`
//! - **Timeouts**: `"<FROM>-<TO>_TIMEOUT"` keys looked up on the message, then
//!   the partition, resource and cluster layers
//! - **Executor**: one transition in flight per partition, handlers run off
//!   the caller's task, late results discarded after a timeout
//! - **Rollback**: a failed or timed-out transition lands the replica in the
//!   error state, with the failure classified and reported exactly once
//!
//! # Example
//!
//! ```rust
//! use partition_transit::builder::{master_slave, TransitionBuilder};
//! use partition_transit::{
//!     MasterSlaveState, PartitionId, StateModelFactory, TimeoutConfig, TimeoutResolver,
//!     TransitionExecutor, TransitionId, TransitionMessage,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let definition = master_slave()
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(MasterSlaveState::Offline)
//!             .to(MasterSlaveState::Slave)
//!             .action(|_msg, _ctx| async { Ok(()) }),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let offline_slave = TransitionId::of(&MasterSlaveState::Offline, &MasterSlaveState::Slave);
//! let config = TimeoutConfig::new().with_cluster_timeout(&offline_slave, 500);
//! let executor = TransitionExecutor::new(
//!     Arc::new(StateModelFactory::new(Arc::new(definition))),
//!     Arc::new(TimeoutResolver::new(config)),
//! );
//!
//! let message = TransitionMessage::new(
//!     PartitionId::new("TestDB", "TestDB_0"),
//!     MasterSlaveState::Offline,
//!     MasterSlaveState::Slave,
//! );
//! let report = executor.execute(message).await.unwrap();
//!
//! assert!(report.is_success());
//! assert_eq!(report.deadline.as_millis(), Some(500));
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod executor;
pub mod message;
pub mod model;
pub mod report;
pub mod rollback;
pub mod timeout;

// Re-export commonly used types
pub use crate::core::{MasterSlaveState, PartitionId, State, StateHistory, TransitionId};
pub use error::{ConfigError, ConfigLayer, ExecutorError};
pub use executor::{
    ExecutorConfig, HandlerError, TransitionContext, TransitionExecutor, TransitionHandle,
    TransitionListener, TransitionReport,
};
pub use message::TransitionMessage;
pub use model::{StateModelDefinition, StateModelFactory, StateModelInstance};
pub use report::NodeStateReport;
pub use rollback::{ErrorClassification, ErrorKind, RollbackHandler, RollbackNotifier};
pub use timeout::{Deadline, TimeoutConfig, TimeoutResolver, TimeoutSource};
