//! Partition and transition identifiers.

use super::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to a transition identifier to form its timeout key.
pub const TIMEOUT_KEY_SUFFIX: &str = "_TIMEOUT";

/// Identifies one partition of one resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct PartitionId {
    pub resource: String,
    pub partition: String,
}

impl PartitionId {
    pub fn new(resource: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            partition: partition.into(),
        }
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource, self.partition)
    }
}

/// Names a transition by its state names, e.g. `SLAVE-MASTER`.
///
/// Timeout configuration is keyed by [`TransitionId::timeout_key`].
///
/// # Example
///
/// ```rust
/// use partition_transit::core::{MasterSlaveState, TransitionId};
///
/// let id = TransitionId::of(&MasterSlaveState::Slave, &MasterSlaveState::Master);
/// assert_eq!(id.to_string(), "SLAVE-MASTER");
/// assert_eq!(id.timeout_key(), "SLAVE-MASTER_TIMEOUT");
/// assert_eq!(TransitionId::from_timeout_key("SLAVE-MASTER_TIMEOUT"), Some(id));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TransitionId {
    pub from: String,
    pub to: String,
}

impl TransitionId {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Identifier for a transition between two states.
    pub fn of<S: State>(from: &S, to: &S) -> Self {
        Self::new(from.name(), to.name())
    }

    pub fn timeout_key(&self) -> String {
        format!("{}-{}{}", self.from, self.to, TIMEOUT_KEY_SUFFIX)
    }

    /// Parse a `<FROM>-<TO>_TIMEOUT` key.
    pub fn from_timeout_key(key: &str) -> Option<Self> {
        let pair = key.strip_suffix(TIMEOUT_KEY_SUFFIX)?;
        let (from, to) = pair.split_once('-')?;
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self::new(from, to))
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
