//! Executor configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`TransitionExecutor`](crate::TransitionExecutor).
///
/// # Example
///
/// ```rust
/// use partition_transit::ExecutorConfig;
///
/// let config = ExecutorConfig::from_json(r#"{ "max_concurrent_transitions": 4 }"#).unwrap();
/// assert_eq!(config.max_concurrent_transitions, Some(4));
/// assert!(config.remove_on_final);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on handlers running at once across all partitions.
    /// `None` leaves parallelism to the runtime.
    pub max_concurrent_transitions: Option<usize>,

    /// Forget a partition once it reaches a terminal state such as DROPPED.
    pub remove_on_final: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_transitions: None,
            remove_on_final: true,
        }
    }
}

impl ExecutorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn with_max_concurrent_transitions(mut self, limit: usize) -> Self {
        self.max_concurrent_transitions = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(
            ExecutorConfig::from_json("{}").unwrap(),
            ExecutorConfig::default()
        );
    }

    #[test]
    fn wrong_types_are_rejected() {
        let result = ExecutorConfig::from_json(r#"{ "remove_on_final": "yes" }"#);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }
}
