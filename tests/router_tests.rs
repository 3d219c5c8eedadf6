//! Registration and matching through the public API
//!
//! # Test Coverage
//!
//! - Matching semantics of verbs, middleware and wildcard layers
//! - Patterns with custom and optional params
//! - Prefix composition and prefix-added params
//! - Param handler ordering in registered stacks
//! - Mounting with mount path and prefix, repeatedly
//! - Pattern errors surfaced at registration

use http::Method;
use stackrouter::error::{PatternError, RouterError};
use stackrouter::router::{Layer, ANY_PATH};
use stackrouter::{handler, param_handler, Context, Handler, ParamHandler, Router};

use tracing_util::TestTracing;

fn noop() -> Handler {
    handler(|_ctx, _next| Ok(()))
}

fn passthrough_param() -> ParamHandler {
    param_handler(|_value, ctx, next| next.run(ctx))
}

fn paths(router: &Router) -> Vec<&str> {
    router.layers().iter().map(|l| l.path()).collect()
}

#[test]
fn test_match_verbs_and_middleware() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.use_middleware([noop()]).unwrap();
    router.get("/users", [noop()]).unwrap();
    router.post("/users", [noop()]).unwrap();
    router.put("/users/:id", [noop()]).unwrap();
    router.delete("/users/:id", [noop()]).unwrap();

    let cases = [
        ("/users", "get", 3, 2, true),
        ("/users", "post", 3, 2, true),
        ("/users", "delete", 3, 1, false),
        ("/users/7", "put", 3, 2, true),
        ("/users/7", "PUT", 3, 2, true),
        ("/nothing", "get", 1, 1, false),
    ];
    for (path, method, path_matched, both_matched, routed) in cases {
        let m = router.match_route(path, method);
        assert_eq!(m.path_matched.len(), path_matched, "{method} {path}");
        assert_eq!(m.path_and_method_matched.len(), both_matched, "{method} {path}");
        assert_eq!(m.routed, routed, "{method} {path}");
    }
}

#[test]
fn test_match_preserves_registration_order() {
    let mut router = Router::new();
    router.get("/a/:x", [noop()]).unwrap();
    router.use_middleware([noop()]).unwrap();
    router.get("/a/b", [noop()]).unwrap();

    let m = router.match_route("/a/b", "get");
    let matched: Vec<&str> = m.path_and_method_matched.iter().map(|l| l.path()).collect();
    assert_eq!(matched, ["/a/:x", "", "/a/b"]);
}

#[test]
fn test_wildcard_route_matches_every_path() {
    let mut router = Router::new();
    router.get(ANY_PATH, [noop()]).unwrap();

    assert!(router.match_route("/", "get").routed);
    assert!(router.match_route("/deep/nested/path", "get").routed);
    assert!(!router.match_route("/deep", "post").routed);
}

#[test]
fn test_path_match_is_case_sensitive() {
    let mut router = Router::new();
    router.get("/Users", [noop()]).unwrap();
    assert!(router.match_route("/Users", "get").routed);
    assert!(!router.match_route("/users", "get").routed);
}

#[test]
fn test_custom_and_optional_params_in_routes() {
    let mut router = Router::new();
    router.get(r"/orders/:id(\d+)", [noop()]).unwrap();
    router.get("/archive/:year?", [noop()]).unwrap();

    assert!(router.match_route("/orders/12", "get").routed);
    assert!(!router.match_route("/orders/twelve", "get").routed);
    assert!(router.match_route("/archive", "get").routed);
    assert!(router.match_route("/archive/2024", "get").routed);

    let dispatcher = router.routes();
    let mut ctx = Context::new(Method::GET, "/archive");
    dispatcher.handle(&mut ctx).unwrap();
    assert!(ctx.params.get("year").is_none());
}

#[test]
fn test_prefix_applies_to_existing_and_future_layers() {
    let mut router = Router::new();
    router.get("/before", [noop()]).unwrap();
    router.prefix("/api/").unwrap();
    router.get("/after", [noop()]).unwrap();

    assert_eq!(paths(&router), ["/api/before", "/api/after"]);
    assert!(!router.match_route("/before", "get").routed);
    assert!(router.match_route("/api/before", "get").routed);
}

#[test]
fn test_prefix_on_middleware_layer_keeps_prefix_matching() {
    let mut router = Router::new();
    router.use_middleware([noop()]).unwrap();
    router.prefix("/api").unwrap();

    let layer: &Layer = &router.layers()[0];
    assert_eq!(layer.path(), "/api");
    assert!(!layer.pattern().is_exact());
    assert!(layer.is_match("/api/anything/below"));
    assert!(!layer.is_match("/other"));
}

#[test]
fn test_prefix_with_param_gets_param_handler() {
    let mut router = Router::new();
    router.param("org", passthrough_param());
    router.get("/repos", [noop()]).unwrap();
    router.prefix("/orgs/:org").unwrap();

    // The handler is only injected at registration or when `param` runs
    assert_eq!(router.layers()[0].stack().len(), 1);
    router.param("org", passthrough_param());
    assert_eq!(router.layers()[0].stack()[0].param(), Some("org"));

    let mut ctx = Context::new(Method::GET, "/orgs/rust/repos");
    router.routes().handle(&mut ctx).unwrap();
    assert_eq!(ctx.params.get("org"), Some("rust"));
}

#[test]
fn test_param_handlers_ordered_by_capture_position() {
    let mut router = Router::new();
    router.param("post", passthrough_param());
    router.param("user", passthrough_param());
    router.get("/users/:user/posts/:post", [noop(), noop()]).unwrap();

    let params: Vec<Option<&str>> = router.layers()[0]
        .stack()
        .iter()
        .map(Handler::param)
        .collect();
    assert_eq!(params, [Some("user"), Some("post"), None, None]);
}

#[test]
fn test_mount_with_path_and_prefix() {
    let mut inner = Router::new();
    inner.get("/b", [noop()]).unwrap();
    inner.use_middleware([noop()]).unwrap();

    let mut outer = Router::new();
    outer.prefix("/api").unwrap();
    outer.use_at("/a", [inner.routes()]).unwrap();

    assert_eq!(paths(&outer), ["/api/a/b", "/api/a"]);
    assert!(outer.match_route("/api/a/b", "get").routed);
    assert!(!outer.match_route("/a/b", "get").routed);
    assert_eq!(paths(&inner), ["/b", ""]);
}

#[test]
fn test_same_router_mounted_twice() {
    let mut inner = Router::new();
    inner.get("/leaf", [noop()]).unwrap();
    let dispatcher = inner.routes();

    let mut outer = Router::new();
    outer.use_at(["/one", "/two"], [dispatcher]).unwrap();
    assert_eq!(paths(&outer), ["/one/leaf", "/two/leaf"]);
}

#[test]
fn test_mounting_a_router_with_a_prefix() {
    let mut inner = Router::new();
    inner.prefix("/users").unwrap();
    inner.get("/:id", [noop()]).unwrap();

    let mut outer = Router::new();
    outer.prefix("/api").unwrap();
    outer.use_middleware([inner.routes()]).unwrap();

    assert_eq!(paths(&outer), ["/api/users/:id"]);
}

#[test]
fn test_layer_accessors() {
    let layer = Layer::new("/users/:id", vec![Method::GET, Method::POST], vec![noop()]).unwrap();
    assert_eq!(layer.path(), "/users/:id");
    assert_eq!(layer.methods(), [Method::GET, Method::POST]);
    assert!(!layer.is_method_agnostic());
    assert!(layer.pattern().is_exact());
    assert_eq!(layer.extract_params("/users/5").unwrap().get("id"), Some("5"));
}

#[test]
fn test_invalid_pattern_at_registration() {
    let mut router = Router::new();
    let err = router.get(r"/x/:id(\d+", [noop()]).unwrap_err();
    assert!(matches!(
        err,
        RouterError::Pattern(PatternError::UnbalancedPattern { .. })
    ));

    let err = router.use_at("/:", [noop()]).unwrap_err();
    assert!(matches!(
        err,
        RouterError::Pattern(PatternError::MissingParamName { offset: 1, .. })
    ));
    assert!(router.layers().is_empty());
}

#[test]
fn test_invalid_prefix_leaves_router_unchanged() {
    let mut router = Router::new();
    router.get("/ok", [noop()]).unwrap();
    assert!(router.prefix("/bad/:").is_err());
    assert_eq!(router.prefix_path(), "");
    assert_eq!(paths(&router), ["/ok"]);
}
