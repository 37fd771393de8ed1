//! Build errors for state model definitions and transitions.

use thiserror::Error;

/// Errors that can occur when building state model definitions and transitions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Error state not specified. Call .error_state(state) before .build()")]
    MissingErrorState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition handler not specified. Call .handler(..), .action(..) or .noop()")]
    MissingHandler,

    #[error("State '{state}' is used but not declared")]
    UndeclaredState { state: String },

    #[error("Transition from '{from}' to '{to}' is defined twice")]
    DuplicateTransition { from: String, to: String },
}
