//! Rollback notification for failed transitions.
//!
//! When a transition times out or its handler fails, the executor forces the
//! replica into its error state and calls [`RollbackNotifier::notify`] exactly
//! once. The notifier bumps the instance's error count, overwrites its last
//! error and runs every registered [`RollbackHandler`].
//!
//! # Example
//!
//! ```rust
//! use partition_transit::core::MasterSlaveState;
//! use partition_transit::rollback::{ErrorClassification, RollbackNotifier};
//! use partition_transit::TransitionMessage;
//! use std::sync::Arc;
//!
//! let notifier = RollbackNotifier::<MasterSlaveState>::new();
//! notifier.register(Arc::new(
//!     |message: &TransitionMessage<MasterSlaveState>, error: &ErrorClassification| {
//!         eprintln!("{} failed: {}", message.partition(), error);
//!     },
//! ));
//! ```

mod classification;
mod notifier;

pub use classification::{ErrorClassification, ErrorKind};
pub use notifier::{RollbackHandler, RollbackNotifier};
