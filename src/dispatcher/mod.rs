//! # Dispatcher Module
//!
//! The dispatcher is what a [`Router`](crate::router::Router) hands to the
//! host pipeline. On every request it matches the router, expands each
//! matched layer into a parameter extraction step plus the layer's handler
//! stack, and runs the flattened list through the composer.
//!
//! ## Request Flow
//!
//! 1. Read the path and lower-cased method from the context
//! 2. Match them against the router's layers
//! 3. If no layer bound to a concrete method matched, call the received
//!    continuation directly so the request falls through
//! 4. Otherwise build `[extract, ...stack]` for every matched layer, in order
//! 5. Run the list with the received continuation as terminal step
//!
//! ## Error Handling
//!
//! Nothing is recovered here. Handler failures, re-entered continuations and
//! extraction failures all surface to the caller as a [`DispatchError`](crate::error::DispatchError).

mod core;

pub use self::core::Dispatcher;
