//! Error types for pattern compilation, registration and dispatch.
//!
//! Nothing in the dispatch core recovers from a failure locally: every
//! [`DispatchError`] surfaces to whoever invoked the composed chain, exactly once.

use thiserror::Error;

/// Failure to compile a path template into a [`PathPattern`](crate::router::PathPattern).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `:` was not followed by a parameter name
    #[error("missing parameter name at offset {offset} in template '{template}'")]
    MissingParamName {
        /// The template being compiled
        template: String,
        /// Byte offset of the offending `:`
        offset: usize,
    },
    /// A custom parameter pattern `:name(...)` was never closed
    #[error("unbalanced pattern for parameter '{name}' in template '{template}'")]
    UnbalancedPattern {
        /// The template being compiled
        template: String,
        /// Parameter whose pattern is unbalanced
        name: String,
    },
    /// A custom parameter pattern contains its own capturing group
    ///
    /// Capturing groups inside a parameter pattern would shift every
    /// following capture, so only `(?:...)` groups are accepted.
    #[error("capturing groups are not allowed in the pattern for parameter '{name}' (use '(?:...)')")]
    CapturingGroup {
        /// Parameter whose pattern contains a capturing group
        name: String,
    },
    /// The generated regular expression failed to compile
    #[error("invalid pattern for template '{template}': {message}")]
    InvalidRegex {
        /// The template being compiled
        template: String,
        /// Error reported by the regex engine
        message: String,
    },
}

/// Errors raised while building up a [`Router`](crate::router::Router).
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route or middleware path could not be compiled
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Failure of a composed handler chain.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler invoked its continuation more than once
    ///
    /// Fatal to the chain instance it happened in.
    #[error("next() called multiple times (continuation index {index})")]
    ReentrantInvocation {
        /// Index of the continuation that was re-entered
        index: usize,
    },
    /// Parameter extraction was attempted on a path the layer does not match
    ///
    /// Indicates a broken routing invariant rather than a user error.
    #[error("path '{path}' does not match layer pattern '{pattern}'")]
    InternalMatch {
        /// Request path handed to the layer
        path: String,
        /// Template of the layer that was asked to extract
        pattern: String,
    },
    /// Failure raised by a registered handler or param handler
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl DispatchError {
    /// True when this error originated in user handler code
    #[must_use]
    pub fn is_handler_error(&self) -> bool {
        matches!(self, DispatchError::Handler(_))
    }
}

/// Result type returned by every handler and continuation.
pub type HandlerResult = Result<(), DispatchError>;
