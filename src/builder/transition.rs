//! Builder for transition definitions.

use crate::builder::error::BuildError;
use crate::core::State;
use crate::executor::handler::{self, HandlerError, TransitionContext, TransitionHandler};
use crate::message::TransitionMessage;
use crate::model::TransitionDefinition;
use std::future::Future;

/// Builder for binding a handler to a (from, to) pair with a fluent API.
pub struct TransitionBuilder<S: State> {
    from: Option<S>,
    to: Option<S>,
    handler: Option<TransitionHandler<S>>,
}

impl<S: State + 'static> TransitionBuilder<S> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            handler: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Bind a prepared handler.
    pub fn handler(mut self, handler: TransitionHandler<S>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind an async closure.
    pub fn action<F, Fut>(self, action: F) -> Self
    where
        F: Fn(TransitionMessage<S>, TransitionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.handler(handler::from_async(action))
    }

    /// Bind a synchronous closure, run on the blocking pool.
    pub fn blocking<F>(self, action: F) -> Self
    where
        F: Fn(&TransitionMessage<S>, &TransitionContext) -> Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.handler(handler::from_blocking(action))
    }

    /// Bind a handler that does nothing and succeeds.
    pub fn noop(self) -> Self {
        self.handler(handler::noop())
    }

    pub fn build(self) -> Result<TransitionDefinition<S>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let handler = self.handler.ok_or(BuildError::MissingHandler)?;

        Ok(TransitionDefinition { from, to, handler })
    }
}

impl<S: State + 'static> Default for TransitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
