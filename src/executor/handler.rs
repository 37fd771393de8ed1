//! Transition handlers and the context they run with.

use crate::core::{PartitionId, State};
use crate::message::TransitionMessage;
use crate::timeout::Deadline;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Failure reported by a transition handler.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("Transition cancelled")]
    Cancelled,

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        Self::Failed(cause.to_string())
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// Handler bound to one (from, to) pair of a state model.
///
/// A fresh future is created for every message.
pub type TransitionHandler<S> =
    Arc<dyn Fn(TransitionMessage<S>, TransitionContext) -> HandlerFuture + Send + Sync>;

/// What a handler gets to know about the attempt it is running in.
///
/// Cancellation is cooperative: once the deadline passes the token is
/// cancelled, and a handler that wants to stop early has to poll
/// [`is_cancelled`](Self::is_cancelled) or await [`cancelled`](Self::cancelled).
/// Anything it does afterwards is ignored.
#[derive(Clone, Debug)]
pub struct TransitionContext {
    partition: PartitionId,
    deadline: Deadline,
    started_at: Instant,
    cancellation: CancellationToken,
}

impl TransitionContext {
    pub(crate) fn new(
        partition: PartitionId,
        deadline: Deadline,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            partition,
            deadline,
            started_at: Instant::now(),
            cancellation,
        }
    }

    pub fn partition(&self) -> &PartitionId {
        &self.partition
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .as_duration()
            .map(|d| d.saturating_sub(self.elapsed()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the executor has given up on this attempt.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

/// Wrap an async closure as a handler.
pub fn from_async<S, F, Fut>(handler: F) -> TransitionHandler<S>
where
    S: State + 'static,
    F: Fn(TransitionMessage<S>, TransitionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(
        move |message: TransitionMessage<S>, context: TransitionContext| -> HandlerFuture {
            handler(message, context).boxed()
        },
    )
}

/// Wrap a synchronous closure as a handler.
///
/// The closure runs on the blocking pool. It cannot be interrupted, so after a
/// timeout it keeps running until it returns on its own.
pub fn from_blocking<S, F>(handler: F) -> TransitionHandler<S>
where
    S: State + 'static,
    F: Fn(&TransitionMessage<S>, &TransitionContext) -> Result<(), HandlerError>
        + Send
        + Sync
        + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |message: TransitionMessage<S>, context: TransitionContext| -> HandlerFuture {
        let handler = Arc::clone(&handler);
        async move {
            match tokio::task::spawn_blocking(move || handler(&message, &context)).await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(HandlerError::from_panic(e.into_panic())),
                Err(e) => Err(HandlerError::failed(e)),
            }
        }
        .boxed()
    })
}

/// Handler that does nothing and succeeds.
pub fn noop<S: State + 'static>() -> TransitionHandler<S> {
    Arc::new(|_: TransitionMessage<S>, _: TransitionContext| -> HandlerFuture {
        futures::future::ready(Ok(())).boxed()
    })
}
