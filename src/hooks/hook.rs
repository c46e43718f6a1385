//! Ordered event hooks.
//!
//! A [`Hook`] is a list of handlers run synchronously in registration order.
//! Handlers are registered through `&mut` access while the application is
//! being initialized; once the application is shared the hook is read-only.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::BoxError;
use crate::http::context::ResponseError;

/// Result of a single hook handler.
pub type HookResult = Result<(), HookError>;

type Handler<T> = Arc<dyn Fn(&mut T) -> HookResult + Send + Sync>;

/// Errors returned by hook handlers.
#[derive(Debug, Error)]
pub enum HookError {
    /// Stop running the remaining handlers without failing the trigger.
    #[error("event hook propagation stopped")]
    StopPropagation,

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("hook handler failed: {0}")]
    Failed(BoxError),
}

impl HookError {
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }
}

/// Identifier returned on registration, used to remove a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

pub struct Hook<T> {
    handlers: Vec<(HandlerId, Handler<T>)>,
    next_id: u64,
}

impl<T> Hook<T> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    /// Append a handler; it runs after the ones already registered.
    pub fn add<F>(&mut self, handler: F) -> HandlerId
    where
        F: Fn(&mut T) -> HookResult + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Prepend a handler; it runs before the ones already registered.
    pub fn pre_add<F>(&mut self, handler: F) -> HandlerId
    where
        F: Fn(&mut T) -> HookResult + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.handlers.insert(0, (id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if the id is unknown.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn remove_all(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every registered handler in order.
    pub fn trigger(&self, event: &mut T) -> HookResult {
        self.trigger_with(event, |_| Ok(()))
    }

    /// Run every registered handler, then `terminal`, as one operation.
    ///
    /// The first failing handler aborts the run and its error is returned.
    /// [`HookError::StopPropagation`] aborts the run but counts as success;
    /// `terminal` is not invoked in that case either.
    pub fn trigger_with<F>(&self, event: &mut T, terminal: F) -> HookResult
    where
        F: FnOnce(&mut T) -> HookResult,
    {
        for (_, handler) in &self.handlers {
            match handler(event) {
                Ok(()) => {}
                Err(HookError::StopPropagation) => return Ok(()),
                Err(err) => return Err(err),
            }
        }

        match terminal(event) {
            Err(HookError::StopPropagation) => Ok(()),
            result => result,
        }
    }

    fn next_id(&mut self) -> HandlerId {
        self.next_id += 1;
        HandlerId(self.next_id)
    }
}

impl<T> Default for Hook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
