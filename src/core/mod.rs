//! Core state model types.
//!
//! This module contains the pure pieces everything else builds on:
//! - State definitions via the `State` trait
//! - Partition and transition identifiers
//! - Per-replica transition history
//! - The stock master/slave state set

mod history;
mod master_slave;
mod partition;
mod state;

pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use master_slave::MasterSlaveState;
pub use partition::{PartitionId, TransitionId, TIMEOUT_KEY_SUFFIX};
pub use state::State;
