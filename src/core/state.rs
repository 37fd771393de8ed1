//! Core State trait for partition replica states.
//!
//! All state model states must implement this trait, which provides
//! pure methods for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for partition replica states.
///
/// All methods are pure. States are small immutable values describing where a
/// replica currently sits in its state model.
///
/// # Required Traits
///
/// - `Clone`: States are copied into messages, reports and history
/// - `Eq` + `Hash`: States key the transition table
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States appear in node state reports
///
/// # Example
///
/// ```rust
/// use partition_transit::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OnlineOffline {
///     Offline,
///     Online,
///     Error,
///     Dropped,
/// }
///
/// impl State for OnlineOffline {
///     fn name(&self) -> &str {
///         match self {
///             Self::Offline => "OFFLINE",
///             Self::Online => "ONLINE",
///             Self::Error => "ERROR",
///             Self::Dropped => "DROPPED",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Dropped)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Error)
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name.
    ///
    /// The name is what timeout configuration keys are built from, so
    /// `"SLAVE-MASTER_TIMEOUT"` addresses the transition between the states
    /// named `SLAVE` and `MASTER`.
    fn name(&self) -> &str;

    /// Check if this is a terminal state.
    ///
    /// A replica reaching a terminal state (such as DROPPED) is removed from
    /// the node.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Offline,
        Online,
        Error,
        Dropped,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Offline => "OFFLINE",
                Self::Online => "ONLINE",
                Self::Error => "ERROR",
                Self::Dropped => "DROPPED",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Dropped)
        }

        fn is_error(&self) -> bool {
            matches!(self, Self::Error)
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Offline.name(), "OFFLINE");
        assert_eq!(TestState::Online.name(), "ONLINE");
        assert_eq!(TestState::Error.name(), "ERROR");
        assert_eq!(TestState::Dropped.name(), "DROPPED");
    }

    #[test]
    fn only_dropped_is_final() {
        assert!(!TestState::Offline.is_final());
        assert!(!TestState::Online.is_final());
        assert!(!TestState::Error.is_final());
        assert!(TestState::Dropped.is_final());
    }

    #[test]
    fn is_error_identifies_error_states() {
        assert!(!TestState::Offline.is_error());
        assert!(TestState::Error.is_error());
    }

    #[test]
    fn states_can_key_hash_sets() {
        let set: HashSet<_> = [TestState::Offline, TestState::Online, TestState::Offline]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Online;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
