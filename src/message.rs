//! Transition messages.
//!
//! A message is an immutable instruction to move one partition replica from
//! one state to another. The dispatch layer creates it, the executor consumes
//! it, and handlers receive a copy.

use crate::core::{PartitionId, State, TransitionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Instruction to perform one state transition on one partition.
///
/// # Example
///
/// ```rust
/// use partition_transit::core::{MasterSlaveState, PartitionId};
/// use partition_transit::TransitionMessage;
/// use std::time::Duration;
///
/// let message = TransitionMessage::new(
///     PartitionId::new("TestDB", "TestDB_0"),
///     MasterSlaveState::Slave,
///     MasterSlaveState::Master,
/// )
/// .with_timeout(Duration::from_millis(200));
///
/// assert_eq!(message.transition_id().timeout_key(), "SLAVE-MASTER_TIMEOUT");
/// assert_eq!(message.timeout(), Some(Duration::from_millis(200)));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionMessage<S: State> {
    id: Uuid,
    partition: PartitionId,
    from: S,
    to: S,
    timeout: Option<Duration>,
    created_at: DateTime<Utc>,
}

impl<S: State> TransitionMessage<S> {
    pub fn new(partition: PartitionId, from: S, to: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            partition,
            from,
            to,
            timeout: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a message-level timeout, which overrides all configured ones.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_millis(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn partition(&self) -> &PartitionId {
        &self.partition
    }

    pub fn resource(&self) -> &str {
        &self.partition.resource
    }

    pub fn from_state(&self) -> &S {
        &self.from
    }

    pub fn to_state(&self) -> &S {
        &self.to
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transition_id(&self) -> TransitionId {
        TransitionId::of(&self.from, &self.to)
    }
}
