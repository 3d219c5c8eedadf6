//! # stackrouter
//!
//! **stackrouter** is a request router and middleware composition engine. An ordered
//! registry of path- and method-scoped handler stacks is matched against an incoming
//! `(path, method)` pair, and the applicable stacks run in a deterministic, nested
//! ("onion") order.
//!
//! ## Overview
//!
//! - **[`router`]** - Path pattern compilation, layers, registration, prefixing,
//!   sub-router mounting and matching
//! - **[`middleware`]** - Handler types and the continuation-passing composer
//! - **[`dispatcher`]** - The per-router function mounted into a host pipeline
//! - **[`context`]** - Mutable per-request state handed to every handler
//! - **[`config`]** - Router options from YAML and the environment
//! - **[`error`]** - Pattern, registration and dispatch errors
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host Pipeline
//!     participant Dispatcher
//!     participant Router
//!     participant Composer
//!     participant Handler as Handlers
//!
//!     Host->>Dispatcher: call(ctx, next)
//!     Dispatcher->>Router: match_route(path, method)
//!     Router-->>Dispatcher: MatchResult { routed, layers }
//!
//!     alt Not routed
//!         Dispatcher->>Host: next.run(ctx)
//!     end
//!
//!     Dispatcher->>Composer: [extract, ...stack] per layer
//!     Composer->>Handler: handler(ctx, next)
//!     Handler->>Composer: next.run(ctx)
//!     Composer->>Host: outer next once the chain is exhausted
//!     Handler-->>Dispatcher: Ok(()) or DispatchError
//!     Dispatcher-->>Host: result
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use anyhow::Context as _;
//! use http::Method;
//! use stackrouter::config::RouterOptions;
//! use stackrouter::context::Context;
//! use stackrouter::middleware::{handler, param_handler};
//! use stackrouter::router::Router;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut api = Router::with_options(&RouterOptions::with_prefix("/api"));
//! api.param("id", param_handler(|id, ctx, next| {
//!     ctx.extensions.insert(id.parse::<u64>().context("id must be numeric")?);
//!     next.run(ctx)
//! }));
//!
//! let mut users = Router::new();
//! users.prefix("/user/")?;
//! users.get("/:id/info", [handler(|ctx, _next| {
//!     let id = ctx.extensions.get::<u64>().copied();
//!     ctx.json(serde_json::json!({ "id": id }));
//!     Ok(())
//! })])?;
//!
//! api.use_middleware([users.routes()])?;
//!
//! let mut ctx = Context::new(Method::GET, "/api/user/42/info");
//! api.routes().handle(&mut ctx)?;
//! assert_eq!(ctx.params.get("id"), Some("42"));
//! assert_eq!(ctx.body, Some(serde_json::json!({ "id": 42 })));
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! Handlers are synchronous functions. Run dispatches on `may` coroutines so a
//! handler blocked on I/O only suspends its own request. A router is mutated
//! during setup only; the [`dispatcher::Dispatcher`] it produces is an
//! immutable snapshot that can be shared across coroutines.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod router;

pub use context::Context;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerResult, PatternError, RouterError};
pub use middleware::{compose, handler, param_handler, Handler, Middleware, Next, ParamHandler};
pub use router::{Layer, MatchResult, Params, Paths, Router};
