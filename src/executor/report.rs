//! Outbound reports for completed executions.

use crate::core::{PartitionId, State};
use crate::rollback::{ErrorClassification, ErrorKind};
use crate::timeout::{Deadline, TimeoutSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// What happened to one transition message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionReport<S: State> {
    pub message_id: Uuid,
    pub partition: PartitionId,
    pub from: S,
    pub to: S,
    /// State the replica ended up in: `to` on success, the error state otherwise.
    pub state: S,
    pub error: Option<ErrorClassification>,
    pub deadline: Deadline,
    pub timeout_source: TimeoutSource,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

impl<S: State> TransitionReport<S> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Consumer of transition reports, e.g. the layer publishing partition state
/// to the rest of the cluster.
pub trait TransitionListener<S: State>: Send + Sync {
    fn on_transition(&self, report: &TransitionReport<S>);
}

impl<S, F> TransitionListener<S> for F
where
    S: State,
    F: Fn(&TransitionReport<S>) + Send + Sync,
{
    fn on_transition(&self, report: &TransitionReport<S>) {
        self(report)
    }
}
