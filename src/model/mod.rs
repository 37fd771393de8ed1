//! State model definitions, instances and the factory that owns them.
//!
//! A [`StateModelDefinition`] is the static transition table. Each partition
//! replica hosted on the node gets one [`StateModelInstance`], created lazily
//! by the [`StateModelFactory`] and mutated only under its single-flight gate.

mod definition;
mod factory;
mod instance;

pub use definition::{StateModelDefinition, TransitionDefinition};
pub use factory::StateModelFactory;
pub use instance::{InFlight, InstanceSnapshot, StateModelInstance};
