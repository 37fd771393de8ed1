//! Effective deadline resolution.

use crate::core::{PartitionId, State, TransitionId};
use crate::error::{ConfigError, ConfigLayer};
use crate::message::TransitionMessage;
use crate::timeout::config::TimeoutConfig;
use crate::timeout::Deadline;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Layer the effective deadline came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutSource {
    Message,
    Partition,
    Resource,
    Cluster,
    Unbounded,
}

impl From<ConfigLayer> for TimeoutSource {
    fn from(layer: ConfigLayer) -> Self {
        match layer {
            ConfigLayer::Partition => Self::Partition,
            ConfigLayer::Resource => Self::Resource,
            ConfigLayer::Cluster => Self::Cluster,
        }
    }
}

/// Outcome of resolving a deadline.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTimeout {
    pub deadline: Deadline,
    pub source: TimeoutSource,
    /// Malformed values skipped on the way, most specific first.
    pub errors: Vec<ConfigError>,
}

/// Computes the deadline for a transition from the layered configuration.
///
/// Most specific wins: the message's own timeout, then the partition, the
/// resource and the cluster layers. With nothing configured the transition is
/// unbounded. The configuration is only ever replaced as a whole, so readers
/// never lock and never observe a half-applied update.
///
/// # Example
///
/// ```rust
/// use partition_transit::core::{PartitionId, TransitionId};
/// use partition_transit::timeout::{Deadline, TimeoutConfig, TimeoutResolver};
/// use std::time::Duration;
///
/// let slave_master = TransitionId::new("SLAVE", "MASTER");
/// let p0 = PartitionId::new("TestDB", "TestDB_0");
/// let p1 = PartitionId::new("TestDB", "TestDB_1");
///
/// let resolver = TimeoutResolver::new(
///     TimeoutConfig::new()
///         .with_cluster_timeout(&slave_master, 300)
///         .with_partition_timeout(&p0, &slave_master, 200),
/// );
///
/// assert_eq!(
///     resolver.deadline_for(&p0, &slave_master),
///     Deadline::Bounded(Duration::from_millis(200))
/// );
/// assert_eq!(
///     resolver.deadline_for(&p1, &slave_master),
///     Deadline::Bounded(Duration::from_millis(300))
/// );
/// ```
pub struct TimeoutResolver {
    config: ArcSwap<TimeoutConfig>,
}

impl TimeoutResolver {
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Replace the whole configuration.
    pub fn update(&self, config: TimeoutConfig) {
        debug!(values = config.len(), "Swapping timeout configuration");
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<TimeoutConfig> {
        self.config.load_full()
    }

    pub fn resolve<S: State>(&self, message: &TransitionMessage<S>) -> ResolvedTimeout {
        self.resolve_for(
            message.partition(),
            &message.transition_id(),
            message.timeout(),
        )
    }

    pub fn resolve_for(
        &self,
        partition: &PartitionId,
        transition: &TransitionId,
        message_timeout: Option<Duration>,
    ) -> ResolvedTimeout {
        if let Some(timeout) = message_timeout {
            return ResolvedTimeout {
                deadline: Deadline::Bounded(timeout),
                source: TimeoutSource::Message,
                errors: Vec::new(),
            };
        }

        let key = transition.timeout_key();
        let config = self.config.load();
        let mut errors = Vec::new();

        for layer in [
            ConfigLayer::Partition,
            ConfigLayer::Resource,
            ConfigLayer::Cluster,
        ] {
            let Some(value) = config.lookup(layer, partition, &key) else {
                continue;
            };

            match value.to_duration() {
                Some(timeout) => {
                    return ResolvedTimeout {
                        deadline: Deadline::Bounded(timeout),
                        source: layer.into(),
                        errors,
                    };
                }
                None => {
                    let error = ConfigError::InvalidTimeout {
                        layer,
                        key: key.clone(),
                        value: value.to_string(),
                    };
                    warn!(partition = %partition, error = %error, "Ignoring malformed timeout");
                    errors.push(error);
                }
            }
        }

        ResolvedTimeout {
            deadline: Deadline::Unbounded,
            source: TimeoutSource::Unbounded,
            errors,
        }
    }

    /// Deadline for `transition` on `partition` when the message carries no
    /// timeout of its own.
    pub fn deadline_for(&self, partition: &PartitionId, transition: &TransitionId) -> Deadline {
        self.resolve_for(partition, transition, None).deadline
    }
}

impl Default for TimeoutResolver {
    fn default() -> Self {
        Self::new(TimeoutConfig::default())
    }
}
