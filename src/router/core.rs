//! Router core - registration, prefixing, mounting and matching.

use http::Method;
use std::sync::Arc;
use tracing::{debug, info};

use super::layer::{Layer, ANY_PATH};
use crate::config::RouterOptions;
use crate::dispatcher::Dispatcher;
use crate::error::RouterError;
use crate::middleware::{Handler, Middleware, ParamHandler};

/// Verbs with a dedicated registration method on [`Router`]
pub const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Path argument of the registration methods
///
/// A registration against [`Paths::Many`] is repeated once per path with the
/// same handler list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paths {
    /// Match any path, any depth
    Any,
    /// A single path template
    One(String),
    /// Several path templates sharing the same handlers
    Many(Vec<String>),
}

impl Paths {
    /// Expand into individual templates; `None` stands for the wildcard
    fn expand(self) -> Vec<Option<String>> {
        match self {
            Paths::Any => vec![None],
            Paths::One(path) => vec![Some(path)],
            Paths::Many(paths) => paths.into_iter().map(Some).collect(),
        }
    }
}

impl From<&str> for Paths {
    fn from(path: &str) -> Self {
        Paths::One(path.to_string())
    }
}

impl From<String> for Paths {
    fn from(path: String) -> Self {
        Paths::One(path)
    }
}

impl From<Vec<String>> for Paths {
    fn from(paths: Vec<String>) -> Self {
        Paths::Many(paths)
    }
}

impl From<Vec<&str>> for Paths {
    fn from(paths: Vec<&str>) -> Self {
        Paths::Many(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Paths {
    fn from(paths: &[&str]) -> Self {
        Paths::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Paths {
    fn from(paths: [&str; N]) -> Self {
        Paths::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Layers applicable to a `(path, method)` pair, in registration order
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Layers whose pattern matches the path
    pub path_matched: Vec<Arc<Layer>>,
    /// Subset of `path_matched` that also accepts the method
    pub path_and_method_matched: Vec<Arc<Layer>>,
    /// True when a layer bound to concrete methods matched, not only middleware
    pub routed: bool,
}

/// Ordered registry of [`Layer`]s with a prefix and named parameter handlers
///
/// Insertion order is significant and never changes: for a given request the
/// matched layers run in the order they were registered. Routers are mutated
/// during setup only; [`Router::routes`] snapshots the router into the
/// [`Dispatcher`] that serves requests.
///
/// # Example
///
/// ```rust
/// use stackrouter::middleware::handler;
/// use stackrouter::router::Router;
///
/// # fn main() -> Result<(), stackrouter::error::RouterError> {
/// let mut users = Router::new();
/// users.get("/:id", [handler(|ctx, _next| {
///     let id = ctx.params.get("id").map(str::to_string);
///     ctx.json(serde_json::json!({ "id": id }));
///     Ok(())
/// })])?;
///
/// let mut api = Router::new();
/// api.prefix("/api")?;
/// api.use_at("/users", [users.routes()])?;
///
/// assert!(api.match_route("/api/users/7", "get").routed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    /// Composed prefix, without trailing slash
    prefix: String,
    layers: Vec<Arc<Layer>>,
    /// Param handlers in first-registration order
    param_handlers: Vec<(Arc<str>, ParamHandler)>,
}

impl Router {
    /// Create an empty router without prefix
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty router from `options`
    #[must_use]
    pub fn with_options(options: &RouterOptions) -> Self {
        let prefix = options.normalized_prefix().to_string();
        info!(prefix = %prefix, "Router created");
        Self {
            prefix,
            ..Self::default()
        }
    }

    /// Verbs with a dedicated registration method
    #[must_use]
    pub fn methods() -> &'static [Method] {
        &METHODS
    }

    /// The composed prefix applied to newly registered layers
    #[must_use]
    pub fn prefix_path(&self) -> &str {
        &self.prefix
    }

    /// Registered layers in insertion order
    #[must_use]
    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    /// Registered param handlers in first-registration order
    pub fn param_handlers(&self) -> impl Iterator<Item = (&str, &ParamHandler)> {
        self.param_handlers.iter().map(|(name, h)| (name.as_ref(), h))
    }

    /// Whether a param handler is registered under `name`
    #[must_use]
    pub fn has_param_handler(&self, name: &str) -> bool {
        self.param_handlers.iter().any(|(n, _)| n.as_ref() == name)
    }

    /// Register method-agnostic middleware on the wildcard path
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a prefixed path fails to compile.
    pub fn use_middleware<I, M>(&mut self, middlewares: I) -> Result<&mut Self, RouterError>
    where
        I: IntoIterator<Item = M>,
        M: Into<Middleware>,
    {
        self.use_at(Paths::Any, middlewares)
    }

    /// Register method-agnostic middleware on one or more paths
    ///
    /// Plain handlers each become their own layer. A mounted [`Dispatcher`]
    /// has every layer of its router cloned, prefixed with the mount path and
    /// then this router's prefix, given this router's param handlers, and
    /// appended here. The mounted router is left untouched, so it can be
    /// mounted again elsewhere.
    ///
    /// With several paths, each path receives the full middleware list once.
    /// An empty path is the wildcard.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a path fails to compile; nothing
    /// from the call is registered in that case.
    pub fn use_at<P, I, M>(&mut self, paths: P, middlewares: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = M>,
        M: Into<Middleware>,
    {
        let paths: Paths = paths.into();
        let middlewares: Vec<Middleware> = middlewares.into_iter().map(Into::into).collect();

        let mut added = Vec::new();
        for path in paths.expand() {
            // An empty middleware path is the wildcard
            let path = path.filter(|p| !p.is_empty());
            for middleware in &middlewares {
                match middleware {
                    Middleware::Handler(handler) => {
                        added.push(self.build_layer(
                            path.as_deref().unwrap_or(ANY_PATH),
                            Vec::new(),
                            vec![handler.clone()],
                        )?);
                    }
                    Middleware::Mounted(dispatcher) => {
                        added.extend(
                            self.mounted_layers(path.as_deref().unwrap_or_default(), dispatcher.router())?,
                        );
                    }
                }
            }
        }

        self.layers.extend(added);
        Ok(self)
    }

    /// Clone `nested`'s layers for flattening into this router under `mount_path`
    fn mounted_layers(&self, mount_path: &str, nested: &Router) -> Result<Vec<Arc<Layer>>, RouterError> {
        let mut cloned = Vec::with_capacity(nested.layers.len());
        for layer in &nested.layers {
            let mut layer = Layer::clone(layer);
            layer.set_prefix(mount_path)?;
            if !self.prefix.is_empty() {
                layer.set_prefix(&self.prefix)?;
            }
            for (name, param_handler) in &self.param_handlers {
                layer.register_param_handler(name, param_handler);
            }
            cloned.push(Arc::new(layer));
        }

        info!(
            mount_path = %mount_path,
            prefix = %self.prefix,
            layers = cloned.len(),
            "Mounted nested router"
        );
        Ok(cloned)
    }

    /// Compile a layer for `path` with the current prefix and param handlers applied
    fn build_layer(
        &self,
        path: &str,
        methods: Vec<Method>,
        handlers: Vec<Handler>,
    ) -> Result<Arc<Layer>, RouterError> {
        let mut layer = Layer::new(path, methods, handlers)?;
        if !self.prefix.is_empty() {
            layer.set_prefix(&self.prefix)?;
        }
        for (name, param_handler) in &self.param_handlers {
            layer.register_param_handler(name, param_handler);
        }

        debug!(
            path = %layer.path(),
            methods = ?layer.methods(),
            params = ?layer.param_names(),
            handlers = layer.stack().len(),
            "Layer registered"
        );
        Ok(Arc::new(layer))
    }

    /// Register a layer for `path` bound to `methods`
    ///
    /// The router's current prefix and every known param handler are applied
    /// before the layer is appended. An empty `methods` list registers
    /// method-agnostic middleware.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if the prefixed path fails to compile.
    pub fn register(
        &mut self,
        path: &str,
        methods: Vec<Method>,
        handlers: Vec<Handler>,
    ) -> Result<&mut Self, RouterError> {
        let layer = self.build_layer(path, methods, handlers)?;
        self.layers.push(layer);
        Ok(self)
    }

    fn register_verb<P, I>(&mut self, method: Method, paths: P, handlers: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = Handler>,
    {
        let paths: Paths = paths.into();
        let handlers: Vec<Handler> = handlers.into_iter().collect();
        let mut added = Vec::new();
        for path in paths.expand() {
            added.push(self.build_layer(
                path.as_deref().unwrap_or(ANY_PATH),
                vec![method.clone()],
                handlers.clone(),
            )?);
        }
        self.layers.extend(added);
        Ok(self)
    }

    /// Register `handlers` for `GET` on one or more paths
    ///
    /// Unlike [`Router::use_at`], an empty path is an exact template: under
    /// a `/api` prefix it matches `/api` only. Pass [`Paths::Any`] for a
    /// catch-all route.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a path fails to compile; nothing
    /// from the call is registered in that case.
    pub fn get<P, I>(&mut self, paths: P, handlers: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = Handler>,
    {
        self.register_verb(Method::GET, paths, handlers)
    }

    /// Register `handlers` for `POST` on one or more paths
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a path fails to compile.
    pub fn post<P, I>(&mut self, paths: P, handlers: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = Handler>,
    {
        self.register_verb(Method::POST, paths, handlers)
    }

    /// Register `handlers` for `PUT` on one or more paths
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a path fails to compile.
    pub fn put<P, I>(&mut self, paths: P, handlers: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = Handler>,
    {
        self.register_verb(Method::PUT, paths, handlers)
    }

    /// Register `handlers` for `DELETE` on one or more paths
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a path fails to compile.
    pub fn delete<P, I>(&mut self, paths: P, handlers: I) -> Result<&mut Self, RouterError>
    where
        P: Into<Paths>,
        I: IntoIterator<Item = Handler>,
    {
        self.register_verb(Method::DELETE, paths, handlers)
    }

    /// Register a handler for the path parameter `name`
    ///
    /// The handler is recorded for layers registered later and injected into
    /// every existing layer that captures `name`. Registering the same name
    /// again replaces the table entry; middlewares already injected stay.
    pub fn param(&mut self, name: &str, param_handler: ParamHandler) -> &mut Self {
        match self.param_handlers.iter_mut().find(|(n, _)| n.as_ref() == name) {
            Some((_, slot)) => *slot = param_handler.clone(),
            None => self
                .param_handlers
                .push((Arc::from(name), param_handler.clone())),
        }

        let mut injected = 0usize;
        for layer in &mut self.layers {
            if Arc::make_mut(layer).register_param_handler(name, &param_handler) {
                injected += 1;
            }
        }
        debug!(param = %name, layers = injected, "Param handler registered");
        self
    }

    /// Add `prefix` in front of the router's current prefix
    ///
    /// Calling `prefix("/v2")` on a router prefixed with `/v1` yields
    /// `/v2/v1`. Existing layers receive only the new segment, since their
    /// paths already carry the earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Pattern`] if a prefixed layer fails to compile;
    /// the router is left unchanged in that case.
    pub fn prefix(&mut self, prefix: &str) -> Result<&mut Self, RouterError> {
        let segment = prefix.strip_suffix('/').unwrap_or(prefix);

        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut layer = Layer::clone(layer);
            layer.set_prefix(segment)?;
            layers.push(Arc::new(layer));
        }

        self.layers = layers;
        self.prefix = format!("{segment}{}", self.prefix);
        info!(segment = %segment, prefix = %self.prefix, "Router prefix updated");
        Ok(self)
    }

    /// Find the layers applicable to `path` and `method`
    ///
    /// Path matching is case-sensitive; `method` is compared
    /// case-insensitively.
    #[must_use]
    pub fn match_route(&self, path: &str, method: &str) -> MatchResult {
        let mut matched = MatchResult::default();

        for layer in &self.layers {
            if !layer.is_match(path) {
                continue;
            }
            matched.path_matched.push(Arc::clone(layer));
            if layer.allows_method(method) {
                matched.path_and_method_matched.push(Arc::clone(layer));
                if !layer.is_method_agnostic() {
                    matched.routed = true;
                }
            }
        }

        debug!(
            path = %path,
            method = %method,
            path_matched = matched.path_matched.len(),
            path_and_method_matched = matched.path_and_method_matched.len(),
            routed = matched.routed,
            "Route match attempt"
        );
        matched
    }

    /// Produce the dispatcher serving this router
    ///
    /// The dispatcher works on a snapshot: registrations made afterwards are
    /// not visible to it.
    #[must_use]
    pub fn routes(&self) -> Dispatcher {
        Dispatcher::new(Arc::new(self.clone()))
    }

    /// Same as [`Router::routes`]
    #[must_use]
    pub fn middleware(&self) -> Dispatcher {
        self.routes()
    }
}
