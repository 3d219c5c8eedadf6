//! Onion-model execution of an ordered handler list.
//!
//! Each call to [`Composed::call`] creates a fresh [`Chain`] on the stack
//! holding the invocation cursor, so concurrent requests running the same
//! composed list never share dispatch state.

use std::cell::Cell;
use std::sync::Arc;

use tracing::warn;

use super::core::Handler;
use crate::context::Context;
use crate::error::{DispatchError, HandlerResult};

/// Per-invocation dispatch state
struct Chain<'a> {
    handlers: &'a [Handler],
    /// Continuation invoked once every handler has passed control on
    outer: Next<'a>,
    /// Highest continuation index dispatched so far
    cursor: Cell<Option<usize>>,
}

impl<'a> Chain<'a> {
    fn dispatch(&'a self, index: usize, ctx: &mut Context) -> HandlerResult {
        if self.cursor.get().is_some_and(|last| index <= last) {
            warn!(
                index,
                path = %ctx.path,
                request_id = %ctx.request_id,
                "next() called multiple times"
            );
            return Err(DispatchError::ReentrantInvocation { index });
        }
        self.cursor.set(Some(index));

        match self.handlers.get(index) {
            Some(handler) => handler.call(
                ctx,
                Next {
                    chain: Some(self),
                    index: index + 1,
                },
            ),
            None => self.outer.clone().run(ctx),
        }
    }
}

/// Continuation handed to each handler
///
/// `run` consumes the continuation, so a handler can only call it once
/// without going out of its way. A clone that is run after the original
/// fails with [`DispatchError::ReentrantInvocation`].
#[derive(Clone)]
pub struct Next<'a> {
    chain: Option<&'a Chain<'a>>,
    index: usize,
}

impl<'a> Next<'a> {
    /// A continuation that completes immediately
    ///
    /// Hosts pass this at the top of their pipeline.
    #[must_use]
    pub fn end() -> Self {
        Self {
            chain: None,
            index: 0,
        }
    }

    /// Run the rest of the chain
    ///
    /// Returns once every downstream handler has completed, or with the
    /// first failure raised downstream.
    pub fn run(self, ctx: &mut Context) -> HandlerResult {
        match self.chain {
            Some(chain) => chain.dispatch(self.index, ctx),
            None => Ok(()),
        }
    }

    /// True for the terminal continuation created by [`Next::end`]
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.chain.is_none()
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("end", &self.is_end())
            .finish()
    }
}

/// An ordered handler list ready to run in nested order
#[derive(Debug, Clone, Default)]
pub struct Composed {
    handlers: Arc<[Handler]>,
}

impl Composed {
    /// Run the handlers with `next` as the terminal continuation
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a handler, by `next`, or a
    /// [`DispatchError::ReentrantInvocation`] when a handler re-enters its
    /// continuation.
    pub fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let chain = Chain {
            handlers: &self.handlers,
            outer: next,
            cursor: Cell::new(None),
        };
        chain.dispatch(0, ctx)
    }

    /// Run the handlers as a complete pipeline
    pub fn run(&self, ctx: &mut Context) -> HandlerResult {
        self.call(ctx, Next::end())
    }

    /// Number of handlers in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when the chain holds no handlers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Wrap the composed chain as a single handler
    #[must_use]
    pub fn into_handler(self) -> Handler {
        Handler::new(move |ctx, next| self.call(ctx, next))
    }
}

/// Compose `handlers` into a single callable
pub fn compose<I>(handlers: I) -> Composed
where
    I: IntoIterator<Item = Handler>,
{
    Composed {
        handlers: handlers.into_iter().collect(),
    }
}
