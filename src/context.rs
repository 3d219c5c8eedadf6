//! Per-request state threaded through a handler chain.

use http::{Extensions, Method};
use serde_json::Value;

pub use crate::ids::REQUEST_ID_HEADER;
use crate::ids::RequestId;
use crate::router::Params;

/// Mutable request context handed to every handler
///
/// The router reads `path` and `method` and writes `params`; everything
/// else belongs to the host and its handlers.
#[derive(Debug)]
pub struct Context {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method
    pub method: Method,
    /// Request path, without query string
    pub path: String,
    /// Path parameters extracted by the matched layers
    pub params: Params,
    /// Response status
    pub status: u16,
    /// Response body
    pub body: Option<Value>,
    /// Arbitrary typed state shared between handlers
    pub extensions: Extensions,
}

impl Context {
    /// Create a context for `method` and `path`
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            params: Params::new(),
            status: 404,
            body: None,
            extensions: Extensions::new(),
        }
    }

    /// Create a context from an `http` request, reusing its request id header when valid
    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        Self {
            request_id: RequestId::from_headers(req.headers()),
            ..Self::new(req.method().clone(), req.uri().path())
        }
    }

    /// Set a JSON body and a 200 status
    pub fn json(&mut self, body: Value) {
        self.status = 200;
        self.body = Some(body);
    }
}
