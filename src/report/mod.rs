//! Point-in-time reports of every partition a node hosts.
//!
//! A [`NodeStateReport`] is what a node publishes so the controller and
//! operators can see where each replica sits, which replicas are in the
//! error state, and why. Handlers are not part of the report.
//!
//! # Example
//!
//! ```rust
//! use partition_transit::builder::{master_slave, noop_transition};
//! use partition_transit::report::NodeStateReport;
//! use partition_transit::{MasterSlaveState, PartitionId, StateModelFactory};
//! use std::sync::Arc;
//!
//! let definition = master_slave()
//!     .add_transition(noop_transition(MasterSlaveState::Offline, MasterSlaveState::Slave))
//!     .build()
//!     .unwrap();
//! let factory = StateModelFactory::new(Arc::new(definition));
//! factory.get_or_create(&PartitionId::new("TestDB", "TestDB_0"));
//!
//! let report = factory.report("localhost_12918");
//! let decoded = NodeStateReport::<MasterSlaveState>::from_json(&report.to_json().unwrap()).unwrap();
//! assert_eq!(decoded.count_in(&MasterSlaveState::Offline), 1);
//! ```

use crate::core::{PartitionId, State};
use crate::model::{InstanceSnapshot, StateModelFactory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::ReportError;

/// Version identifier for the report format.
pub const REPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NodeStateReport<S: State> {
    /// Report format version
    pub version: u32,

    /// Unique report identifier
    pub id: String,

    /// Node that produced the report
    pub node: String,

    /// Name of the state model the partitions follow
    pub state_model: String,

    pub generated_at: DateTime<Utc>,

    /// One entry per hosted partition, ordered by partition id
    pub partitions: Vec<InstanceSnapshot<S>>,
}

impl<S: State> NodeStateReport<S> {
    pub fn new(
        node: impl Into<String>,
        state_model: impl Into<String>,
        mut partitions: Vec<InstanceSnapshot<S>>,
    ) -> Self {
        partitions.sort_by(|a, b| a.partition.cmp(&b.partition));
        Self {
            version: REPORT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            node: node.into(),
            state_model: state_model.into(),
            generated_at: Utc::now(),
            partitions,
        }
    }

    pub fn get(&self, partition: &PartitionId) -> Option<&InstanceSnapshot<S>> {
        self.partitions
            .binary_search_by(|snapshot| snapshot.partition.cmp(partition))
            .ok()
            .map(|index| &self.partitions[index])
    }

    pub fn state_of(&self, partition: &PartitionId) -> Option<&S> {
        self.get(partition).map(|snapshot| &snapshot.state)
    }

    /// Number of partitions currently in `state`.
    pub fn count_in(&self, state: &S) -> usize {
        self.partitions.iter().filter(|p| &p.state == state).count()
    }

    /// Partitions that have recorded at least one failure.
    pub fn failed(&self) -> impl Iterator<Item = &InstanceSnapshot<S>> {
        self.partitions.iter().filter(|p| p.error_count > 0)
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_str(json)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()?;
        Ok(report)
    }

    /// Compact binary encoding for transport between nodes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        bincode::serialize(self).map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let report: Self = bincode::deserialize(bytes)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()?;
        Ok(report)
    }

    fn check_version(&self) -> Result<(), ReportError> {
        if self.version != REPORT_VERSION {
            return Err(ReportError::UnsupportedVersion {
                found: self.version,
                supported: REPORT_VERSION,
            });
        }
        Ok(())
    }
}

impl<S: State> StateModelFactory<S> {
    /// Snapshot every hosted partition into a report for `node`.
    pub fn report(&self, node: impl Into<String>) -> NodeStateReport<S> {
        NodeStateReport::new(node, self.definition().name(), self.snapshots())
    }
}
