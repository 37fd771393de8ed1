//! Builder API for state model definitions.
//!
//! Transition tables are constructed explicitly and validated once, at
//! `build()`, rather than being discovered at runtime.

pub mod definition;
pub mod error;
pub mod macros;
pub mod transition;

pub use definition::StateModelDefinitionBuilder;
pub use error::BuildError;
pub use transition::TransitionBuilder;

use crate::core::{MasterSlaveState, State};
use crate::model::TransitionDefinition;

/// Create a transition whose handler does nothing and succeeds.
///
/// # Example
///
/// ```
/// use partition_transit::builder::noop_transition;
/// use partition_transit::core::MasterSlaveState;
///
/// let transition = noop_transition(MasterSlaveState::Offline, MasterSlaveState::Slave);
/// assert_eq!(transition.id().to_string(), "OFFLINE-SLAVE");
/// ```
pub fn noop_transition<S>(from: S, to: S) -> TransitionDefinition<S>
where
    S: State + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .to(to)
        .noop()
        .build()
        .expect("No-op transition should always build")
}

/// Start a master/slave definition: all five states declared, OFFLINE initial
/// and ERROR as the error state. Only the transitions remain to be added.
///
/// # Example
///
/// ```
/// use partition_transit::builder::{master_slave, noop_transition};
/// use partition_transit::core::MasterSlaveState;
///
/// let definition = master_slave()
///     .add_transition(noop_transition(MasterSlaveState::Offline, MasterSlaveState::Slave))
///     .add_transition(noop_transition(MasterSlaveState::Slave, MasterSlaveState::Master))
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.states().len(), 5);
/// ```
pub fn master_slave() -> StateModelDefinitionBuilder<MasterSlaveState> {
    StateModelDefinitionBuilder::new("MasterSlave")
        .states(MasterSlaveState::all())
        .initial(MasterSlaveState::Offline)
        .error_state(MasterSlaveState::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_transition_builds() {
        let transition = noop_transition(MasterSlaveState::Slave, MasterSlaveState::Master);

        assert_eq!(transition.from, MasterSlaveState::Slave);
        assert_eq!(transition.to, MasterSlaveState::Master);
    }

    #[test]
    fn master_slave_declares_all_states() {
        let definition = master_slave()
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .build()
            .unwrap();

        for state in MasterSlaveState::all() {
            assert!(definition.is_declared(&state));
        }
    }
}
