use std::fmt;
use std::sync::Arc;

use super::compose::Next;
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::HandlerResult;

type HandlerFn = dyn for<'n> Fn(&mut Context, Next<'n>) -> HandlerResult + Send + Sync;
type ParamHandlerFn = dyn for<'n> Fn(&str, &mut Context, Next<'n>) -> HandlerResult + Send + Sync;

/// A middleware function with the continuation-passing contract
///
/// The function receives the request context and the continuation for the
/// rest of the chain. Calling `next.run(ctx)` runs everything downstream and
/// returns once it has finished; not calling it short-circuits the chain.
///
/// Handlers installed by [`Router::param`](crate::router::Router::param) are
/// tagged with the parameter they serve, which is how a layer keeps its param
/// middlewares ordered by capture position.
#[derive(Clone)]
pub struct Handler {
    func: Arc<HandlerFn>,
    param: Option<Arc<str>>,
}

impl Handler {
    /// Wrap a function as a handler
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Context, Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            param: None,
        }
    }

    /// Build the middleware that feeds the `name` parameter into `param_handler`
    ///
    /// The value is read from `ctx.params` when the middleware runs, after the
    /// layer's extraction step has populated them.
    pub(crate) fn for_param(name: Arc<str>, param_handler: ParamHandler) -> Self {
        let key = Arc::clone(&name);
        let mut handler = Handler::new(move |ctx, next| {
            let value = match ctx.params.get(&key) {
                Some(value) => value.to_string(),
                None => {
                    tracing::debug!(param = %key, path = %ctx.path, "Param handler found no value");
                    String::new()
                }
            };
            param_handler.call(&value, ctx, next)
        });
        handler.param = Some(name);
        handler
    }

    /// The parameter this handler is bound to, if it is a param middleware
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Invoke the handler
    #[inline]
    pub fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        (self.func)(ctx, next)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

/// A handler bound to a named path parameter
///
/// Invoked with the captured value before the route's own handlers.
#[derive(Clone)]
pub struct ParamHandler {
    func: Arc<ParamHandlerFn>,
}

impl ParamHandler {
    /// Wrap a function as a param handler
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, &mut Context, Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Invoke the param handler with the captured `value`
    #[inline]
    pub fn call(&self, value: &str, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        (self.func)(value, ctx, next)
    }
}

impl fmt::Debug for ParamHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamHandler").finish_non_exhaustive()
    }
}

/// Argument accepted by [`Router::use_middleware`](crate::router::Router::use_middleware)
///
/// A plain handler becomes its own method-agnostic layer. A mounted
/// dispatcher has its router's layers flattened into the mounting router
/// instead of being called as an opaque function.
#[derive(Debug, Clone)]
pub enum Middleware {
    /// An ordinary middleware function
    Handler(Handler),
    /// Another router, mounted by its dispatcher
    Mounted(Dispatcher),
}

impl From<Handler> for Middleware {
    fn from(handler: Handler) -> Self {
        Middleware::Handler(handler)
    }
}

impl From<Dispatcher> for Middleware {
    fn from(dispatcher: Dispatcher) -> Self {
        Middleware::Mounted(dispatcher)
    }
}

/// Shorthand for [`Handler::new`]
pub fn handler<F>(func: F) -> Handler
where
    F: Fn(&mut Context, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Handler::new(func)
}

/// Shorthand for [`ParamHandler::new`]
pub fn param_handler<F>(func: F) -> ParamHandler
where
    F: Fn(&str, &mut Context, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    ParamHandler::new(func)
}
