//! # Middleware Module
//!
//! Handler types and the onion-model composer.
//!
//! A handler receives the request [`Context`](crate::context::Context) and a
//! [`Next`] continuation. Everything before `next.run(ctx)` runs on the way
//! in, everything after it on the way out:
//!
//! ```rust
//! use stackrouter::context::Context;
//! use stackrouter::middleware::{compose, handler};
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let (outer_log, inner_log) = (Arc::clone(&log), Arc::clone(&log));
//!
//! let chain = compose([
//!     handler(move |ctx, next| {
//!         outer_log.lock().unwrap().push("outer in");
//!         next.run(ctx)?;
//!         outer_log.lock().unwrap().push("outer out");
//!         Ok(())
//!     }),
//!     handler(move |_ctx, _next| {
//!         inner_log.lock().unwrap().push("inner");
//!         Ok(())
//!     }),
//! ]);
//!
//! let mut ctx = Context::new(http::Method::GET, "/");
//! chain.run(&mut ctx).unwrap();
//! assert_eq!(*log.lock().unwrap(), ["outer in", "inner", "outer out"]);
//! ```

mod compose;
mod core;
#[cfg(test)]
mod tests;

pub use compose::{compose, Composed, Next};
pub use self::core::{handler, param_handler, Handler, Middleware, ParamHandler};
