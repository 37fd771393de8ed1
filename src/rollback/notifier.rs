//! Delivery of rollback notifications.

use crate::core::State;
use crate::executor::HandlerError;
use crate::message::TransitionMessage;
use crate::model::StateModelInstance;
use crate::rollback::classification::ErrorClassification;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

/// Hook invoked when a transition fails.
///
/// Implementations observe the failure after the replica has been forced into
/// its error state; they cannot change the outcome.
pub trait RollbackHandler<S: State>: Send + Sync {
    fn rollback_on_error(&self, message: &TransitionMessage<S>, error: &ErrorClassification);
}

impl<S, F> RollbackHandler<S> for F
where
    S: State,
    F: Fn(&TransitionMessage<S>, &ErrorClassification) + Send + Sync,
{
    fn rollback_on_error(&self, message: &TransitionMessage<S>, error: &ErrorClassification) {
        self(message, error)
    }
}

/// Records failures on the instance and fans them out to registered hooks.
pub struct RollbackNotifier<S: State> {
    hooks: RwLock<Vec<Arc<dyn RollbackHandler<S>>>>,
}

impl<S: State> RollbackNotifier<S> {
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, hook: Arc<dyn RollbackHandler<S>>) {
        self.hooks.write().push(hook);
    }

    /// Record `error` on `instance` and run every hook.
    ///
    /// Called once per failed attempt. Returns the instance's new error count.
    pub fn notify(
        &self,
        instance: &StateModelInstance<S>,
        message: &TransitionMessage<S>,
        error: ErrorClassification,
    ) -> u64 {
        let count = instance.record_error(error.clone());
        warn!(
            partition = %instance.partition(),
            from = message.from_state().name(),
            to = message.to_state().name(),
            kind = %error.kind,
            error_count = count,
            "Transition rolled back"
        );

        let hooks = self.hooks.read().clone();
        for hook in hooks {
            let delivered =
                panic::catch_unwind(AssertUnwindSafe(|| hook.rollback_on_error(message, &error)));
            if let Err(payload) = delivered {
                error!(
                    partition = %instance.partition(),
                    cause = %HandlerError::from_panic(payload),
                    "Rollback hook panicked"
                );
            }
        }
        count
    }
}

impl<S: State> Default for RollbackNotifier<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MasterSlaveState, PartitionId};
    use crate::rollback::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message() -> TransitionMessage<MasterSlaveState> {
        TransitionMessage::new(
            PartitionId::new("TestDB", "TestDB_0"),
            MasterSlaveState::Slave,
            MasterSlaveState::Master,
        )
    }

    #[test]
    fn notify_increments_count_by_one() {
        let notifier = RollbackNotifier::new();
        let instance = StateModelInstance::new(
            PartitionId::new("TestDB", "TestDB_0"),
            MasterSlaveState::Slave,
            4,
        );

        let count = notifier.notify(
            &instance,
            &message(),
            ErrorClassification::timeout(std::time::Duration::from_millis(200)),
        );

        assert_eq!(count, 1);
        assert_eq!(instance.error_count(), 1);
        assert_eq!(instance.last_error().unwrap().kind, ErrorKind::Timeout);
    }

    #[test]
    fn hooks_receive_each_notification() {
        let notifier = RollbackNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        notifier.register(Arc::new(
            move |_m: &TransitionMessage<MasterSlaveState>, e: &ErrorClassification| {
                assert_eq!(e.kind, ErrorKind::Exception);
                seen.fetch_add(1, Ordering::SeqCst);
            },
        ));

        let instance = StateModelInstance::new(
            PartitionId::new("TestDB", "TestDB_0"),
            MasterSlaveState::Slave,
            4,
        );
        notifier.notify(&instance, &message(), ErrorClassification::exception("boom"));
        notifier.notify(&instance, &message(), ErrorClassification::exception("again"));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(instance.error_count(), 2);
    }

    #[test]
    fn panicking_hook_does_not_stop_the_others() {
        let notifier = RollbackNotifier::new();
        notifier.register(Arc::new(
            |_m: &TransitionMessage<MasterSlaveState>, _e: &ErrorClassification| {
                panic!("hook bug");
            },
        ));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        notifier.register(Arc::new(
            move |_m: &TransitionMessage<MasterSlaveState>, _e: &ErrorClassification| {
                seen.fetch_add(1, Ordering::SeqCst);
            },
        ));

        let instance = StateModelInstance::new(
            PartitionId::new("TestDB", "TestDB_0"),
            MasterSlaveState::Slave,
            4,
        );
        let count = notifier.notify(&instance, &message(), ErrorClassification::exception("boom"));

        assert_eq!(count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
