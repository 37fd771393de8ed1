//! Builder for state model definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::State;
use crate::executor::handler;
use crate::model::{StateModelDefinition, TransitionDefinition};
use std::collections::HashMap;

/// Builder for constructing state model definitions with a fluent API.
///
/// All checks happen in [`build`](Self::build): every state a transition
/// touches must be declared (when states are declared at all) and no
/// (from, to) pair may be bound twice.
pub struct StateModelDefinitionBuilder<S: State + 'static> {
    name: String,
    states: Vec<S>,
    initial: Option<S>,
    error_state: Option<S>,
    transitions: Vec<TransitionDefinition<S>>,
    reset_from_error: bool,
}

impl<S: State + 'static> StateModelDefinitionBuilder<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            initial: None,
            error_state: None,
            transitions: Vec::new(),
            reset_from_error: false,
        }
    }

    /// Declare the state set. When omitted, it is inferred from the initial
    /// state, the error state and the transitions.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the state failed transitions are forced into (required).
    pub fn error_state(mut self, state: S) -> Self {
        self.error_state = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionDefinition<S>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionDefinition<S>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Register a no-op transition from the error state back to the initial
    /// state, unless one is bound explicitly.
    pub fn reset_from_error(mut self) -> Self {
        self.reset_from_error = true;
        self
    }

    pub fn build(self) -> Result<StateModelDefinition<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let error_state = self.error_state.ok_or(BuildError::MissingErrorState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut transitions = HashMap::with_capacity(self.transitions.len() + 1);
        for transition in self.transitions {
            let key = (transition.from.clone(), transition.to.clone());
            if transitions.contains_key(&key) {
                return Err(BuildError::DuplicateTransition {
                    from: transition.from.name().to_string(),
                    to: transition.to.name().to_string(),
                });
            }
            transitions.insert(key, transition);
        }

        if self.reset_from_error && initial != error_state {
            transitions
                .entry((error_state.clone(), initial.clone()))
                .or_insert_with(|| TransitionDefinition {
                    from: error_state.clone(),
                    to: initial.clone(),
                    handler: handler::noop(),
                });
        }

        let states = if self.states.is_empty() {
            let mut inferred = vec![initial.clone()];
            let used = transitions
                .keys()
                .flat_map(|(from, to)| [from, to])
                .chain(std::iter::once(&error_state));
            for state in used {
                if !inferred.contains(state) {
                    inferred.push(state.clone());
                }
            }
            inferred
        } else {
            let used = transitions
                .keys()
                .flat_map(|(from, to)| [from, to])
                .chain([&initial, &error_state]);
            for state in used {
                if !self.states.contains(state) {
                    return Err(BuildError::UndeclaredState {
                        state: state.name().to_string(),
                    });
                }
            }
            self.states
        };

        Ok(StateModelDefinition {
            name: self.name,
            states,
            initial,
            error_state,
            transitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{master_slave, noop_transition};
    use crate::core::MasterSlaveState;

    #[test]
    fn builder_validates_required_fields() {
        let result = StateModelDefinitionBuilder::<MasterSlaveState>::new("MasterSlave").build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));

        let result = StateModelDefinitionBuilder::new("MasterSlave")
            .initial(MasterSlaveState::Offline)
            .build();
        assert!(matches!(result, Err(BuildError::MissingErrorState)));
    }

    #[test]
    fn builder_requires_transitions() {
        let result = master_slave().build();
        assert!(matches!(result, Err(BuildError::NoTransitions)));
    }

    #[test]
    fn duplicate_transitions_are_rejected() {
        let result = master_slave()
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::DuplicateTransition {
                from: "OFFLINE".to_string(),
                to: "SLAVE".to_string(),
            }
        );
    }

    #[test]
    fn undeclared_states_are_rejected() {
        let result = StateModelDefinitionBuilder::new("Partial")
            .states([MasterSlaveState::Offline, MasterSlaveState::Error])
            .initial(MasterSlaveState::Offline)
            .error_state(MasterSlaveState::Error)
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::UndeclaredState {
                state: "SLAVE".to_string(),
            }
        );
    }

    #[test]
    fn states_are_inferred_when_not_declared() {
        let definition = StateModelDefinitionBuilder::new("Inferred")
            .initial(MasterSlaveState::Offline)
            .error_state(MasterSlaveState::Error)
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .build()
            .unwrap();

        assert_eq!(definition.states()[0], MasterSlaveState::Offline);
        assert!(definition.is_declared(&MasterSlaveState::Slave));
        assert!(definition.is_declared(&MasterSlaveState::Error));
        assert!(!definition.is_declared(&MasterSlaveState::Master));
    }

    #[test]
    fn reset_from_error_adds_recovery_transition() {
        let definition = master_slave()
            .add_transition(noop_transition(
                MasterSlaveState::Offline,
                MasterSlaveState::Slave,
            ))
            .reset_from_error()
            .build()
            .unwrap();

        assert!(definition.has_transition(&MasterSlaveState::Error, &MasterSlaveState::Offline));
        assert_eq!(definition.name(), "MasterSlave");
        assert_eq!(definition.initial_state(), &MasterSlaveState::Offline);
        assert_eq!(definition.error_state(), &MasterSlaveState::Error);
    }
}
