//! Dispatcher core - turns a match into a composed handler chain.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::HandlerResult;
use crate::middleware::{compose, Handler, Next};
use crate::router::{Layer, MatchResult, Router};

/// The function a [`Router`] exposes for mounting into a host pipeline
///
/// Holds a snapshot of the router it was produced from. Passing a dispatcher
/// to [`Router::use_middleware`] flattens that router into the mounting one;
/// anywhere else it behaves as ordinary middleware.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub(crate) fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// The router this dispatcher serves
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route `ctx` and run the matched chain, continuing with `next`
    ///
    /// When no layer bound to a concrete method matches, no handler runs and
    /// `next` is invoked directly. Otherwise each matched layer contributes a
    /// parameter extraction step followed by its stack, and the flattened list
    /// runs with `next` as its terminal continuation.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of the chain unchanged.
    pub fn call(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let method = ctx.method.as_str().to_ascii_lowercase();
        let matched = self.router.match_route(&ctx.path, &method);

        if !matched.routed {
            debug!(
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                "No endpoint matched, passing through"
            );
            return next.run(ctx);
        }

        let chain = build_chain(matched);
        debug!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            handlers = chain.len(),
            "Dispatching matched chain"
        );
        compose(chain).call(ctx, next)
    }

    /// Run the dispatcher as a complete pipeline
    ///
    /// # Errors
    ///
    /// Propagates the first failure of the chain unchanged.
    pub fn handle(&self, ctx: &mut Context) -> HandlerResult {
        self.call(ctx, Next::end())
    }

    /// Wrap the dispatcher as an opaque handler
    ///
    /// Unlike passing the dispatcher itself to
    /// [`Router::use_middleware`], the result is never flattened.
    #[must_use]
    pub fn into_handler(self) -> Handler {
        Handler::new(move |ctx, next| self.call(ctx, next))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.router.prefix_path())
            .field("layers", &self.router.layers().len())
            .finish()
    }
}

fn build_chain(matched: MatchResult) -> Vec<Handler> {
    let capacity = matched
        .path_and_method_matched
        .iter()
        .map(|layer| layer.stack().len() + 1)
        .sum();
    let mut chain = Vec::with_capacity(capacity);
    for layer in matched.path_and_method_matched {
        let stack = layer.stack().to_vec();
        chain.push(extract_params_step(layer));
        chain.extend(stack);
    }
    chain
}

/// Merge the layer's captures over any params set by earlier layers
fn extract_params_step(layer: Arc<Layer>) -> Handler {
    Handler::new(move |ctx, next| {
        let params = layer.extract_params(&ctx.path)?;
        ctx.params.merge(params);
        next.run(ctx)
    })
}
