//! Per-replica transition history.
//!
//! Every state change applied to a replica, whether reached through its
//! handler or forced after a failure, is appended here.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Number of records retained when no capacity is given.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Record of a single applied state change.
///
/// # Example
///
/// ```rust
/// use partition_transit::core::{MasterSlaveState, StateTransition};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let transition = StateTransition {
///     message_id: Uuid::new_v4(),
///     from: MasterSlaveState::Offline,
///     to: MasterSlaveState::Slave,
///     timestamp: Utc::now(),
///     forced: false,
/// };
/// assert!(!transition.forced);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// Message that caused the change
    pub message_id: Uuid,
    /// The state the replica was in
    pub from: S,
    /// The state the replica ended up in
    pub to: S,
    /// When the change was applied
    pub timestamp: DateTime<Utc>,
    /// True when the state was forced to the error state instead of being
    /// reached through the handler
    pub forced: bool,
}

/// Bounded, ordered history of state changes.
///
/// Once full, the oldest record is evicted for each new one.
///
/// # Example
///
/// ```rust
/// use partition_transit::core::{MasterSlaveState, StateHistory, StateTransition};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     message_id: Uuid::new_v4(),
///     from: MasterSlaveState::Offline,
///     to: MasterSlaveState::Slave,
///     timestamp: Utc::now(),
///     forced: false,
/// });
/// history.record(StateTransition {
///     message_id: Uuid::new_v4(),
///     from: MasterSlaveState::Slave,
///     to: MasterSlaveState::Error,
///     timestamp: Utc::now(),
///     forced: true,
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3);
/// assert_eq!(history.forced_count(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    capacity: usize,
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding up to [`DEFAULT_HISTORY_CAPACITY`] records.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty history holding up to `capacity` records.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            transitions: Vec::new(),
        }
    }

    /// Append a record, evicting the oldest ones so at most `capacity` remain.
    pub fn record(&mut self, transition: StateTransition<S>) {
        let excess = (self.transitions.len() + 1).saturating_sub(self.capacity);
        self.transitions.drain(..excess);
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record, then the `to`
    /// state of each record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Number of retained records that were forced into the error state.
    pub fn forced_count(&self) -> usize {
        self.transitions.iter().filter(|t| t.forced).count()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// All retained records, oldest first.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MasterSlaveState;

    fn change(from: MasterSlaveState, to: MasterSlaveState) -> StateTransition<MasterSlaveState> {
        StateTransition {
            message_id: Uuid::new_v4(),
            from,
            to,
            timestamp: Utc::now(),
            forced: false,
        }
    }

    #[test]
    fn empty_history_has_no_path() {
        let history: StateHistory<MasterSlaveState> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_appends_in_order() {
        let mut history = StateHistory::new();
        history.record(change(MasterSlaveState::Offline, MasterSlaveState::Slave));
        history.record(change(MasterSlaveState::Slave, MasterSlaveState::Master));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![
                &MasterSlaveState::Offline,
                &MasterSlaveState::Slave,
                &MasterSlaveState::Master
            ]
        );
        assert_eq!(history.last().unwrap().to, MasterSlaveState::Master);
    }

    #[test]
    fn full_history_evicts_oldest() {
        let mut history = StateHistory::with_capacity(2);
        history.record(change(MasterSlaveState::Offline, MasterSlaveState::Slave));
        history.record(change(MasterSlaveState::Slave, MasterSlaveState::Master));
        history.record(change(MasterSlaveState::Master, MasterSlaveState::Slave));

        assert_eq!(history.len(), 2);
        assert_eq!(history.transitions()[0].from, MasterSlaveState::Slave);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut history = StateHistory::with_capacity(0);
        history.record(change(MasterSlaveState::Offline, MasterSlaveState::Slave));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn forced_records_are_counted() {
        let mut history = StateHistory::new();
        history.record(change(MasterSlaveState::Offline, MasterSlaveState::Slave));
        let mut forced = change(MasterSlaveState::Slave, MasterSlaveState::Error);
        forced.forced = true;
        history.record(forced);

        assert_eq!(history.forced_count(), 1);
    }

    #[test]
    fn overfull_history_is_trimmed_on_next_record() {
        let mut full = StateHistory::with_capacity(4);
        for _ in 0..4 {
            full.record(change(MasterSlaveState::Offline, MasterSlaveState::Slave));
        }
        let mut json = serde_json::to_value(&full).unwrap();
        json["capacity"] = serde_json::json!(2);
        let mut history: StateHistory<MasterSlaveState> = serde_json::from_value(json).unwrap();
        assert_eq!(history.len(), 4);

        history.record(change(MasterSlaveState::Slave, MasterSlaveState::Master));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().to, MasterSlaveState::Master);
    }
}
