//! Per-partition state model instances.

use crate::core::{PartitionId, State, StateHistory, StateTransition};
use crate::rollback::ErrorClassification;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// The state one node holds for one partition replica.
///
/// Readers may inspect it at any time. Only the executor holding the
/// partition's [`InFlight`] gate writes to it.
#[derive(Debug)]
pub struct StateModelInstance<S: State> {
    partition: PartitionId,
    inner: RwLock<InstanceState<S>>,
    in_flight: Mutex<Option<Uuid>>,
}

#[derive(Debug)]
struct InstanceState<S: State> {
    current: S,
    last_error: Option<ErrorClassification>,
    error_count: u64,
    history: StateHistory<S>,
    updated_at: DateTime<Utc>,
}

/// Point-in-time view of an instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct InstanceSnapshot<S: State> {
    pub partition: PartitionId,
    pub state: S,
    pub last_error: Option<ErrorClassification>,
    pub error_count: u64,
    pub in_flight: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl<S: State> StateModelInstance<S> {
    pub(crate) fn new(partition: PartitionId, initial: S, history_capacity: usize) -> Self {
        Self {
            partition,
            inner: RwLock::new(InstanceState {
                current: initial,
                last_error: None,
                error_count: 0,
                history: StateHistory::with_capacity(history_capacity),
                updated_at: Utc::now(),
            }),
            in_flight: Mutex::new(None),
        }
    }

    pub fn partition(&self) -> &PartitionId {
        &self.partition
    }

    pub fn current_state(&self) -> S {
        self.inner.read().current.clone()
    }

    pub fn last_error(&self) -> Option<ErrorClassification> {
        self.inner.read().last_error.clone()
    }

    pub fn error_count(&self) -> u64 {
        self.inner.read().error_count
    }

    pub fn history(&self) -> StateHistory<S> {
        self.inner.read().history.clone()
    }

    /// Message currently being executed for this partition, if any.
    pub fn in_flight(&self) -> Option<Uuid> {
        *self.in_flight.lock()
    }

    pub fn snapshot(&self) -> InstanceSnapshot<S> {
        let in_flight = self.in_flight();
        let inner = self.inner.read();
        InstanceSnapshot {
            partition: self.partition.clone(),
            state: inner.current.clone(),
            last_error: inner.last_error.clone(),
            error_count: inner.error_count,
            in_flight,
            updated_at: inner.updated_at,
        }
    }

    /// Claim the single-flight gate for `message_id`.
    ///
    /// Fails with the id of the message already holding it.
    pub(crate) fn try_begin(self: &Arc<Self>, message_id: Uuid) -> Result<InFlight<S>, Uuid> {
        let mut slot = self.in_flight.lock();
        if let Some(current) = *slot {
            return Err(current);
        }
        *slot = Some(message_id);
        Ok(InFlight {
            instance: Arc::clone(self),
            message_id,
        })
    }

    fn release(&self, message_id: Uuid) {
        let mut slot = self.in_flight.lock();
        if *slot == Some(message_id) {
            *slot = None;
        }
    }

    pub(crate) fn record_error(&self, error: ErrorClassification) -> u64 {
        let mut inner = self.inner.write();
        inner.error_count += 1;
        inner.last_error = Some(error);
        inner.updated_at = Utc::now();
        inner.error_count
    }
}

/// Exclusive right to execute one message against one instance.
///
/// The gate is released when this is dropped.
#[derive(Debug)]
pub struct InFlight<S: State> {
    instance: Arc<StateModelInstance<S>>,
    message_id: Uuid,
}

impl<S: State> InFlight<S> {
    pub fn instance(&self) -> &Arc<StateModelInstance<S>> {
        &self.instance
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// Move the instance to `to`, returning the state it left.
    pub(crate) fn apply(&self, to: S, forced: bool) -> S {
        let mut inner = self.instance.inner.write();
        let from = std::mem::replace(&mut inner.current, to.clone());
        let now = Utc::now();
        inner.history.record(StateTransition {
            message_id: self.message_id,
            from: from.clone(),
            to,
            timestamp: now,
            forced,
        });
        inner.updated_at = now;
        from
    }
}

impl<S: State> Drop for InFlight<S> {
    fn drop(&mut self) {
        self.instance.release(self.message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MasterSlaveState;

    fn instance() -> Arc<StateModelInstance<MasterSlaveState>> {
        Arc::new(StateModelInstance::new(
            PartitionId::new("TestDB", "TestDB_0"),
            MasterSlaveState::Offline,
            8,
        ))
    }

    #[test]
    fn new_instance_starts_clean() {
        let instance = instance();
        assert_eq!(instance.current_state(), MasterSlaveState::Offline);
        assert_eq!(instance.error_count(), 0);
        assert!(instance.last_error().is_none());
        assert!(instance.in_flight().is_none());
        assert!(instance.history().is_empty());
    }

    #[test]
    fn gate_admits_one_message_at_a_time() {
        let instance = instance();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let gate = instance.try_begin(first).unwrap();
        assert_eq!(instance.in_flight(), Some(first));
        assert_eq!(instance.try_begin(second).unwrap_err(), first);

        drop(gate);
        assert!(instance.in_flight().is_none());
        assert!(instance.try_begin(second).is_ok());
    }

    #[test]
    fn apply_updates_state_and_history() {
        let instance = instance();
        let gate = instance.try_begin(Uuid::new_v4()).unwrap();

        let left = gate.apply(MasterSlaveState::Slave, false);
        assert_eq!(left, MasterSlaveState::Offline);
        assert_eq!(instance.current_state(), MasterSlaveState::Slave);

        let history = instance.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().message_id, gate.message_id());
    }

    #[test]
    fn record_error_counts_and_overwrites() {
        let instance = instance();
        assert_eq!(
            instance.record_error(ErrorClassification::exception("first")),
            1
        );
        assert_eq!(
            instance.record_error(ErrorClassification::framework("second")),
            2
        );
        assert_eq!(
            instance.last_error(),
            Some(ErrorClassification::framework("second"))
        );
    }

    #[test]
    fn snapshot_reflects_current_values() {
        let instance = instance();
        instance.record_error(ErrorClassification::exception("boom"));
        let snapshot = instance.snapshot();
        assert_eq!(snapshot.state, MasterSlaveState::Offline);
        assert_eq!(snapshot.error_count, 1);
        assert_eq!(snapshot.partition, PartitionId::new("TestDB", "TestDB_0"));
    }
}
