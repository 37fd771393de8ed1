//! Deadline-bounded execution of state transitions.

use crate::core::{PartitionId, State};
use crate::error::ExecutorError;
use crate::executor::config::ExecutorConfig;
use crate::executor::handler::{HandlerError, TransitionContext};
use crate::executor::report::{TransitionListener, TransitionReport};
use crate::message::TransitionMessage;
use crate::model::{InFlight, StateModelFactory, StateModelInstance, TransitionDefinition};
use crate::rollback::{ErrorClassification, ErrorKind, RollbackNotifier};
use crate::timeout::{Deadline, ResolvedTimeout, TimeoutResolver};
use chrono::Utc;
use futures::FutureExt;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// How a single handler attempt ended.
#[derive(Debug)]
enum AttemptOutcome {
    Succeeded,
    Failed(ErrorClassification),
}

/// Runs transition handlers for the partitions hosted by one node.
///
/// Each partition executes at most one message at a time; a second message
/// submitted while one is in flight is rejected. Every execution ends with the
/// replica either in the message's target state or in the state model's error
/// state, and a failed execution notifies the rollback notifier exactly once.
///
/// Cloning is cheap; clones share the same partitions and configuration.
pub struct TransitionExecutor<S: State + 'static> {
    factory: Arc<StateModelFactory<S>>,
    resolver: Arc<TimeoutResolver>,
    notifier: Arc<RollbackNotifier<S>>,
    listeners: Arc<RwLock<Vec<Arc<dyn TransitionListener<S>>>>>,
    permits: Option<Arc<Semaphore>>,
    config: ExecutorConfig,
}

impl<S: State + 'static> Clone for TransitionExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            resolver: Arc::clone(&self.resolver),
            notifier: Arc::clone(&self.notifier),
            listeners: Arc::clone(&self.listeners),
            permits: self.permits.clone(),
            config: self.config.clone(),
        }
    }
}

/// Handle to a submitted transition.
#[derive(Debug)]
pub struct TransitionHandle<S: State> {
    message_id: Uuid,
    partition: PartitionId,
    join: JoinHandle<TransitionReport<S>>,
}

impl<S: State + 'static> TransitionHandle<S> {
    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn partition(&self) -> &PartitionId {
        &self.partition
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the transition to resolve.
    pub async fn wait(self) -> Result<TransitionReport<S>, ExecutorError> {
        self.join
            .await
            .map_err(|e| ExecutorError::Runtime(e.to_string()))
    }
}

impl<S: State + 'static> TransitionExecutor<S> {
    pub fn new(factory: Arc<StateModelFactory<S>>, resolver: Arc<TimeoutResolver>) -> Self {
        Self {
            factory,
            resolver,
            notifier: Arc::new(RollbackNotifier::new()),
            listeners: Arc::new(RwLock::new(Vec::new())),
            permits: None,
            config: ExecutorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.permits = config
            .max_concurrent_transitions
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        self.config = config;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<RollbackNotifier<S>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn add_listener(&self, listener: Arc<dyn TransitionListener<S>>) {
        self.listeners.write().push(listener);
    }

    pub fn factory(&self) -> &Arc<StateModelFactory<S>> {
        &self.factory
    }

    pub fn resolver(&self) -> &Arc<TimeoutResolver> {
        &self.resolver
    }

    pub fn notifier(&self) -> &Arc<RollbackNotifier<S>> {
        &self.notifier
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute `message` and wait for it to resolve.
    ///
    /// Timeouts and handler failures are not errors here: they are reflected
    /// in the returned report and on the replica itself.
    pub async fn execute(
        &self,
        message: TransitionMessage<S>,
    ) -> Result<TransitionReport<S>, ExecutorError> {
        self.submit(message)?.wait().await
    }

    /// Start executing `message` in the background.
    ///
    /// Fails immediately if the state model has no handler for the message's
    /// transition, or if the partition already has a message in flight. Must
    /// be called from within a tokio runtime.
    pub fn submit(
        &self,
        message: TransitionMessage<S>,
    ) -> Result<TransitionHandle<S>, ExecutorError> {
        let transition = self
            .factory
            .definition()
            .transition(message.from_state(), message.to_state())?
            .clone();

        let gate = self.claim_partition(&message)?;

        let resolved = self.resolver.resolve(&message);
        let span = info_span!(
            "transition",
            partition = %message.partition(),
            from = message.from_state().name(),
            to = message.to_state().name(),
        );

        let message_id = message.id();
        let partition = message.partition().clone();
        let executor = self.clone();
        let join = tokio::spawn(
            async move { executor.run(gate, transition, message, resolved).await }.instrument(span),
        );

        Ok(TransitionHandle {
            message_id,
            partition,
            join,
        })
    }

    /// Take the single-flight gate of the partition's live instance.
    ///
    /// An instance removed after reaching a terminal state may still be
    /// claimed through a stale handle; such a claim is dropped and the lookup
    /// repeated so the transition runs on the instance the factory tracks.
    fn claim_partition(
        &self,
        message: &TransitionMessage<S>,
    ) -> Result<InFlight<S>, ExecutorError> {
        loop {
            let instance = self.factory.get_or_create(message.partition());
            let gate = self.begin_on(&instance, message)?;
            if self.factory.is_current(&instance) {
                return Ok(gate);
            }
            debug!(
                partition = %message.partition(),
                "Instance was removed while claiming it, retrying"
            );
        }
    }

    fn begin_on(
        &self,
        instance: &Arc<StateModelInstance<S>>,
        message: &TransitionMessage<S>,
    ) -> Result<InFlight<S>, ExecutorError> {
        instance.try_begin(message.id()).map_err(|in_flight| {
            warn!(
                partition = %message.partition(),
                rejected = %message.id(),
                in_flight = %in_flight,
                "Rejecting transition for partition with one already in flight"
            );
            ExecutorError::SingleFlightViolation {
                partition: message.partition().clone(),
                in_flight,
            }
        })
    }

    async fn run(
        self,
        gate: InFlight<S>,
        transition: TransitionDefinition<S>,
        message: TransitionMessage<S>,
        resolved: ResolvedTimeout,
    ) -> TransitionReport<S> {
        let _permit = match &self.permits {
            Some(permits) => Arc::clone(permits).acquire_owned().await.ok(),
            None => None,
        };
        let started = Instant::now();

        let current = gate.instance().current_state();
        let outcome = if &current != message.from_state() {
            AttemptOutcome::Failed(ErrorClassification::framework(format!(
                "replica is {} but the message expects {}",
                current.name(),
                message.from_state().name()
            )))
        } else {
            info!(deadline = %resolved.deadline, source = ?resolved.source, "Starting transition");
            self.attempt(&transition, &message, resolved.deadline).await
        };

        let report = match outcome {
            AttemptOutcome::Succeeded => self.complete(&gate, &message, &resolved, started),
            AttemptOutcome::Failed(error) => self.fail(&gate, &message, &resolved, error, started),
        };
        drop(gate);

        let listeners = self.listeners.read().clone();
        for listener in listeners {
            let delivered =
                panic::catch_unwind(AssertUnwindSafe(|| listener.on_transition(&report)));
            if let Err(payload) = delivered {
                error!(
                    cause = %HandlerError::from_panic(payload),
                    "Transition listener panicked"
                );
            }
        }
        report
    }

    /// Race the handler against the deadline.
    ///
    /// Whoever claims `decided` first owns the outcome. A handler that finishes
    /// after the deadline claimed it has its result dropped.
    async fn attempt(
        &self,
        transition: &TransitionDefinition<S>,
        message: &TransitionMessage<S>,
        deadline: Deadline,
    ) -> AttemptOutcome {
        let token = CancellationToken::new();
        let context = TransitionContext::new(message.partition().clone(), deadline, token.clone());
        let decided = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = oneshot::channel();

        let handler = Arc::clone(&transition.handler);
        let handler_message = message.clone();
        let handler_decided = Arc::clone(&decided);
        tokio::spawn(
            async move {
                // Creating the future runs handler code too.
                let invocation = async move { handler(handler_message, context).await };
                let result = match AssertUnwindSafe(invocation).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(HandlerError::from_panic(payload)),
                };
                if claim(&handler_decided) {
                    let _ = tx.send(result);
                } else {
                    debug!(?result, "Discarding handler result that arrived after the deadline");
                }
            }
            .in_current_span(),
        );

        let result = match deadline.as_duration() {
            None => rx.await,
            Some(limit) => {
                tokio::select! {
                    biased;
                    result = &mut rx => result,
                    _ = tokio::time::sleep(limit) => {
                        if claim(&decided) {
                            token.cancel();
                            return AttemptOutcome::Failed(ErrorClassification::timeout(limit));
                        }
                        // The handler finished first; its result is on the way.
                        (&mut rx).await
                    }
                }
            }
        };

        match result {
            Ok(Ok(())) => AttemptOutcome::Succeeded,
            Ok(Err(e)) => AttemptOutcome::Failed(ErrorClassification::exception(e)),
            Err(_) => AttemptOutcome::Failed(ErrorClassification::framework(
                "handler task ended without reporting a result",
            )),
        }
    }

    fn complete(
        &self,
        gate: &InFlight<S>,
        message: &TransitionMessage<S>,
        resolved: &ResolvedTimeout,
        started: Instant,
    ) -> TransitionReport<S> {
        let to = message.to_state().clone();
        gate.apply(to.clone(), false);
        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "Transition completed");

        if to.is_final() && self.config.remove_on_final {
            debug!("Partition reached a terminal state, removing it");
            self.factory.remove(message.partition());
        }

        self.report(message, to, None, resolved, elapsed)
    }

    fn fail(
        &self,
        gate: &InFlight<S>,
        message: &TransitionMessage<S>,
        resolved: &ResolvedTimeout,
        error: ErrorClassification,
        started: Instant,
    ) -> TransitionReport<S> {
        let error_state = self.factory.definition().error_state().clone();
        gate.apply(error_state.clone(), true);
        let elapsed = started.elapsed();

        let elapsed_ms = elapsed.as_millis() as u64;
        if error.kind == ErrorKind::Framework {
            error!(elapsed_ms, cause = ?error.cause, "Transition could not run");
        } else {
            warn!(elapsed_ms, kind = %error.kind, cause = ?error.cause, "Transition failed");
        }

        self.notifier.notify(gate.instance(), message, error.clone());
        self.report(message, error_state, Some(error), resolved, elapsed)
    }

    fn report(
        &self,
        message: &TransitionMessage<S>,
        state: S,
        error: Option<ErrorClassification>,
        resolved: &ResolvedTimeout,
        elapsed: std::time::Duration,
    ) -> TransitionReport<S> {
        TransitionReport {
            message_id: message.id(),
            partition: message.partition().clone(),
            from: message.from_state().clone(),
            to: message.to_state().clone(),
            state,
            error,
            deadline: resolved.deadline,
            timeout_source: resolved.source,
            elapsed,
            completed_at: Utc::now(),
        }
    }
}

fn claim(decided: &AtomicBool) -> bool {
    decided
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}
