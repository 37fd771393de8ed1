//! Declarative state model definitions.

use crate::core::{State, TransitionId};
use crate::error::ConfigError;
use crate::executor::handler::TransitionHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A handler bound to one (from, to) pair.
pub struct TransitionDefinition<S: State> {
    pub from: S,
    pub to: S,
    pub handler: TransitionHandler<S>,
}

impl<S: State> TransitionDefinition<S> {
    pub fn id(&self) -> TransitionId {
        TransitionId::of(&self.from, &self.to)
    }
}

impl<S: State> Clone for TransitionDefinition<S> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S: State> fmt::Debug for TransitionDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDefinition")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// The finite set of states of a resource, its initial and error states, and
/// the table of valid transitions with their handlers.
///
/// Built and validated once by
/// [`StateModelDefinitionBuilder`](crate::builder::StateModelDefinitionBuilder);
/// immutable afterwards.
pub struct StateModelDefinition<S: State> {
    pub(crate) name: String,
    pub(crate) states: Vec<S>,
    pub(crate) initial: S,
    pub(crate) error_state: S,
    pub(crate) transitions: HashMap<(S, S), TransitionDefinition<S>>,
}

impl<S: State> StateModelDefinition<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn initial_state(&self) -> &S {
        &self.initial
    }

    /// State a replica is forced into when a transition fails.
    pub fn error_state(&self) -> &S {
        &self.error_state
    }

    pub fn is_declared(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    /// Look up the transition bound to `(from, to)`.
    pub fn transition(&self, from: &S, to: &S) -> Result<&TransitionDefinition<S>, ConfigError> {
        self.transitions
            .get(&(from.clone(), to.clone()))
            .ok_or_else(|| ConfigError::MissingTransition {
                from: from.name().to_string(),
                to: to.name().to_string(),
            })
    }

    pub fn has_transition(&self, from: &S, to: &S) -> bool {
        self.transition(from, to).is_ok()
    }

    /// States reachable from `from` in one transition.
    pub fn targets_from(&self, from: &S) -> Vec<&S> {
        self.transitions
            .values()
            .filter(|t| &t.from == from)
            .map(|t| &t.to)
            .collect()
    }

    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.transitions.values().map(TransitionDefinition::id)
    }
}

impl<S: State> fmt::Debug for StateModelDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateModelDefinition")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("initial", &self.initial)
            .field("error_state", &self.error_state)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{master_slave, noop_transition};
    use crate::core::MasterSlaveState;
    use crate::error::ConfigError;

    #[test]
    fn lookup_of_undefined_transition_is_a_configuration_error() {
        let definition = master_slave()
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .build()
            .unwrap();

        assert!(definition.has_transition(&MasterSlaveState::Offline, &MasterSlaveState::Slave));
        assert_eq!(
            definition
                .transition(&MasterSlaveState::Offline, &MasterSlaveState::Master)
                .unwrap_err(),
            ConfigError::MissingTransition {
                from: "OFFLINE".to_string(),
                to: "MASTER".to_string(),
            }
        );
    }

    #[test]
    fn targets_from_lists_outgoing_transitions() {
        let definition = master_slave()
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Dropped,
            ))
            .build()
            .unwrap();

        let mut targets = definition.targets_from(&MasterSlaveState::Offline);
        targets.sort_by_key(|s| format!("{s:?}"));
        assert_eq!(
            targets,
            vec![&MasterSlaveState::Dropped, &MasterSlaveState::Slave]
        );
        assert!(definition.targets_from(&MasterSlaveState::Dropped).is_empty());
    }
}
