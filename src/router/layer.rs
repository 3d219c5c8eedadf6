//! A single registered entry of a [`Router`](super::Router).

use http::Method;
use std::sync::Arc;
use tracing::error;

use super::params::Params;
use super::pattern::{PathPattern, PatternOptions};
use crate::error::{DispatchError, PatternError};
use crate::middleware::{Handler, ParamHandler};

/// Sentinel path meaning "any path, any depth"
pub const ANY_PATH: &str = "*";

/// One compiled path pattern plus its bound methods and handler stack
///
/// A layer with no methods is method-agnostic middleware rather than a
/// routable endpoint. Layers are plain values: mounting a router into another
/// clones them, so the same layer is never shared by two routers.
#[derive(Debug, Clone)]
pub struct Layer {
    path: String,
    /// Whether the pattern must match the whole path
    end: bool,
    pattern: PathPattern,
    methods: Vec<Method>,
    stack: Vec<Handler>,
}

impl Layer {
    /// Compile `path` and build a layer around `stack`
    ///
    /// The [`ANY_PATH`] sentinel becomes the empty template matched as a
    /// prefix, so it matches every path.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if `path` is not a valid template.
    pub fn new(path: &str, methods: Vec<Method>, stack: Vec<Handler>) -> Result<Self, PatternError> {
        let (path, end) = if path == ANY_PATH {
            (String::new(), false)
        } else {
            (path.to_string(), true)
        };
        let pattern = PathPattern::compile(&path, PatternOptions { end })?;
        Ok(Self {
            path,
            end,
            pattern,
            methods,
            stack,
        })
    }

    /// The layer's full path template, prefixes included
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The compiled pattern
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Methods this layer is bound to; empty for method-agnostic middleware
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Parameter names in capture order
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        self.pattern.param_names()
    }

    /// The handler stack, param middlewares included
    #[must_use]
    pub fn stack(&self) -> &[Handler] {
        &self.stack
    }

    /// True when the layer is not bound to any method
    #[must_use]
    pub fn is_method_agnostic(&self) -> bool {
        self.methods.is_empty()
    }

    /// Test whether `path` matches this layer's pattern
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Test whether the layer accepts `method` (compared case-insensitively)
    #[must_use]
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.as_str().eq_ignore_ascii_case(method))
    }

    /// Extract path parameters from a path this layer matches
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InternalMatch`] if `path` does not match;
    /// callers must only extract after a successful match.
    pub fn extract_params(&self, path: &str) -> Result<Params, DispatchError> {
        self.pattern.extract(path).ok_or_else(|| {
            error!(path = %path, pattern = %self.path, "Param extraction on non-matching path");
            DispatchError::InternalMatch {
                path: path.to_string(),
                pattern: self.path.clone(),
            }
        })
    }

    /// Insert a middleware feeding the `name` parameter to `param_handler`
    ///
    /// Param middlewares are kept in the same left-to-right order as their
    /// captures in the path: the new one goes in front of the first stack
    /// entry that is either a regular handler or serves a parameter captured
    /// at or after `name`. Returns `false` without touching the stack when
    /// this layer has no such parameter.
    pub fn register_param_handler(&mut self, name: &str, param_handler: &ParamHandler) -> bool {
        let names = self.pattern.param_names();
        let Some(x) = names.iter().position(|n| n.as_ref() == name) else {
            return false;
        };

        let at = self
            .stack
            .iter()
            .position(|h| match h.param() {
                None => true,
                Some(bound) => names
                    .iter()
                    .position(|n| n.as_ref() == bound)
                    .is_some_and(|i| i >= x),
            })
            .unwrap_or(self.stack.len());

        let middleware = Handler::for_param(Arc::clone(&names[x]), param_handler.clone());
        self.stack.insert(at, middleware);
        true
    }

    /// Prepend `prefix` to the layer path and recompile the pattern
    ///
    /// One trailing slash is stripped from `prefix` first. On error the layer
    /// is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the prefixed template does not compile.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<(), PatternError> {
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        let path = format!("{prefix}{}", self.path);
        self.pattern = PathPattern::compile(&path, PatternOptions { end: self.end })?;
        self.path = path;
        Ok(())
    }
}
