//! Errors surfaced synchronously to callers.
//!
//! Transition failures (timeouts, handler errors) are never returned here;
//! they are absorbed into the replica's state and delivered through the
//! rollback notifier. Only problems the caller has to fix come back as `Err`.

use crate::core::PartitionId;
use thiserror::Error;
use uuid::Uuid;

/// Configuration layer a timeout value was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConfigLayer {
    Partition,
    Resource,
    Cluster,
}

/// Malformed or missing configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("No transition defined from '{from}' to '{to}'")]
    MissingTransition { from: String, to: String },

    #[error("Invalid timeout '{value}' for {key} at {layer:?} level, expected non-negative milliseconds")]
    InvalidTimeout {
        layer: ConfigLayer,
        key: String,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors returned by `TransitionExecutor::submit` and `execute`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Partition {partition} already has transition {in_flight} in flight")]
    SingleFlightViolation {
        partition: PartitionId,
        in_flight: Uuid,
    },

    #[error("Transition supervisor failed: {0}")]
    Runtime(String),
}

impl ExecutorError {
    pub fn is_single_flight_violation(&self) -> bool {
        matches!(self, Self::SingleFlightViolation { .. })
    }
}
