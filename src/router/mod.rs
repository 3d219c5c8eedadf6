//! # Router Module
//!
//! The router module holds the registration and matching engine: an ordered
//! registry of layers, each a compiled path pattern with its bound methods
//! and handler stack.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (`/users/:id`) into regex matchers
//! - Registering routes and method-agnostic middleware in insertion order
//! - Applying prefixes, including to layers registered earlier
//! - Flattening mounted sub-routers into the mounting router
//! - Injecting param handlers into every layer capturing their parameter
//! - Matching a `(path, method)` pair to the applicable layers
//!
//! ## Architecture
//!
//! 1. **Setup**: routes, middleware, param handlers and prefixes are applied
//!    eagerly. Every layer always carries the router's current prefix and
//!    every known param handler, whatever order the calls came in.
//!
//! 2. **Matching**: each request is tested against every layer in insertion
//!    order. There is no priority beyond registration order.
//!
//! ## Example
//!
//! ```rust
//! use stackrouter::middleware::{handler, param_handler};
//! use stackrouter::router::Router;
//!
//! # fn main() -> Result<(), stackrouter::error::RouterError> {
//! let mut router = Router::new();
//! router.param("id", param_handler(|_id, ctx, next| next.run(ctx)));
//! router.get(["/pets/:id", "/animals/:id"], [handler(|_ctx, _next| Ok(()))])?;
//!
//! let matched = router.match_route("/pets/42", "get");
//! assert!(matched.routed);
//! assert_eq!(matched.path_and_method_matched.len(), 1);
//! # Ok(())
//! # }
//! ```

mod core;
mod layer;
mod params;
mod pattern;

pub use self::core::{MatchResult, Paths, Router, METHODS};
pub use layer::{Layer, ANY_PATH};
pub use params::{ParamVec, Params, MAX_INLINE_PARAMS};
pub use pattern::{PathPattern, PatternOptions};
