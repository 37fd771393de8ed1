//! Layered timeout configuration.

use crate::core::{PartitionId, TransitionId};
use crate::error::{ConfigError, ConfigLayer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// A configured timeout as it was written.
///
/// Values are kept raw so malformed entries surface at resolution time, where
/// they are reported and skipped instead of failing the whole configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeoutValue {
    Millis(i64),
    Text(String),
}

impl TimeoutValue {
    /// Interpret the value as non-negative milliseconds.
    pub fn to_duration(&self) -> Option<Duration> {
        let millis = match self {
            Self::Millis(millis) => *millis,
            Self::Text(text) => text.trim().parse::<i64>().ok()?,
        };
        u64::try_from(millis).ok().map(Duration::from_millis)
    }
}

impl From<u64> for TimeoutValue {
    fn from(millis: u64) -> Self {
        i64::try_from(millis)
            .map(Self::Millis)
            .unwrap_or_else(|_| Self::Text(millis.to_string()))
    }
}

impl From<&str> for TimeoutValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl fmt::Display for TimeoutValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(millis) => write!(f, "{millis}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Where a value is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeoutScope {
    Cluster,
    Resource(String),
    Partition(PartitionId),
}

/// Cluster defaults, per-resource overrides and per-partition overrides, all
/// keyed by `"<FROM>-<TO>_TIMEOUT"`.
///
/// # Example
///
/// ```rust
/// use partition_transit::core::TransitionId;
/// use partition_transit::timeout::TimeoutConfig;
///
/// let config = TimeoutConfig::from_json(r#"{
///     "cluster": { "SLAVE-MASTER_TIMEOUT": 300 },
///     "partitions": { "TestDB": { "TestDB_0": { "SLAVE-MASTER_TIMEOUT": "200" } } }
/// }"#).unwrap();
///
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub cluster: HashMap<String, TimeoutValue>,
    pub resources: HashMap<String, HashMap<String, TimeoutValue>>,
    pub partitions: HashMap<String, HashMap<String, HashMap<String, TimeoutValue>>>,
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    /// Write `value` under `key` at `scope`, replacing any previous value.
    pub fn insert(&mut self, scope: TimeoutScope, key: impl Into<String>, value: TimeoutValue) {
        let key = key.into();
        match scope {
            TimeoutScope::Cluster => {
                self.cluster.insert(key, value);
            }
            TimeoutScope::Resource(resource) => {
                self.resources.entry(resource).or_default().insert(key, value);
            }
            TimeoutScope::Partition(partition) => {
                self.partitions
                    .entry(partition.resource)
                    .or_default()
                    .entry(partition.partition)
                    .or_default()
                    .insert(key, value);
            }
        }
    }

    pub fn with_cluster_timeout(mut self, transition: &TransitionId, millis: u64) -> Self {
        self.insert(TimeoutScope::Cluster, transition.timeout_key(), millis.into());
        self
    }

    pub fn with_resource_timeout(
        mut self,
        resource: impl Into<String>,
        transition: &TransitionId,
        millis: u64,
    ) -> Self {
        self.insert(
            TimeoutScope::Resource(resource.into()),
            transition.timeout_key(),
            millis.into(),
        );
        self
    }

    pub fn with_partition_timeout(
        mut self,
        partition: &PartitionId,
        transition: &TransitionId,
        millis: u64,
    ) -> Self {
        self.insert(
            TimeoutScope::Partition(partition.clone()),
            transition.timeout_key(),
            millis.into(),
        );
        self
    }

    /// Raw value stored under `key` at `layer` for `partition`.
    pub fn lookup(
        &self,
        layer: ConfigLayer,
        partition: &PartitionId,
        key: &str,
    ) -> Option<&TimeoutValue> {
        match layer {
            ConfigLayer::Partition => self
                .partitions
                .get(&partition.resource)?
                .get(&partition.partition)?
                .get(key),
            ConfigLayer::Resource => self.resources.get(&partition.resource)?.get(key),
            ConfigLayer::Cluster => self.cluster.get(key),
        }
    }

    /// Total number of configured values across all layers.
    pub fn len(&self) -> usize {
        self.cluster.len()
            + self.resources.values().map(HashMap::len).sum::<usize>()
            + self
                .partitions
                .values()
                .flat_map(HashMap::values)
                .map(HashMap::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slave_master() -> TransitionId {
        TransitionId::new("SLAVE", "MASTER")
    }

    #[test]
    fn values_parse_as_non_negative_millis() {
        assert_eq!(
            TimeoutValue::Millis(300).to_duration(),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            TimeoutValue::from(" 200 ").to_duration(),
            Some(Duration::from_millis(200))
        );
        assert_eq!(TimeoutValue::Millis(0).to_duration(), Some(Duration::ZERO));
        assert_eq!(TimeoutValue::Millis(-1).to_duration(), None);
        assert_eq!(TimeoutValue::from("-5").to_duration(), None);
        assert_eq!(TimeoutValue::from("soon").to_duration(), None);
    }

    #[test]
    fn insert_places_values_in_their_layer() {
        let partition = PartitionId::new("TestDB", "TestDB_0");
        let config = TimeoutConfig::new()
            .with_cluster_timeout(&slave_master(), 300)
            .with_resource_timeout("TestDB", &slave_master(), 250)
            .with_partition_timeout(&partition, &slave_master(), 200);

        let key = slave_master().timeout_key();
        assert_eq!(
            config.lookup(ConfigLayer::Cluster, &partition, &key),
            Some(&TimeoutValue::Millis(300))
        );
        assert_eq!(
            config.lookup(ConfigLayer::Resource, &partition, &key),
            Some(&TimeoutValue::Millis(250))
        );
        assert_eq!(
            config.lookup(ConfigLayer::Partition, &partition, &key),
            Some(&TimeoutValue::Millis(200))
        );

        let other = PartitionId::new("TestDB", "TestDB_1");
        assert_eq!(config.lookup(ConfigLayer::Partition, &other, &key), None);
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let config = TimeoutConfig::from_json(
            r#"{
                "cluster": { "SLAVE-MASTER_TIMEOUT": 300, "OFFLINE-SLAVE_TIMEOUT": "abc" },
                "resources": { "TestDB": { "SLAVE-MASTER_TIMEOUT": "250" } }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.cluster.get("SLAVE-MASTER_TIMEOUT"),
            Some(&TimeoutValue::Millis(300))
        );
        assert_eq!(
            config.cluster.get("OFFLINE-SLAVE_TIMEOUT"),
            Some(&TimeoutValue::Text("abc".to_string()))
        );
        assert!(config.partitions.is_empty());
    }

    #[test]
    fn invalid_json_is_a_configuration_error() {
        let result = TimeoutConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }
}
