//! The endpoint registry facade over the host web framework.
//!
//! The host framework is reached through [`RouteHost`], a deliberately thin
//! contract: list the registered keys, add a route idempotently. Widgets go
//! through [`Registry::ensure_route`] so that constructing the same widget
//! twice never double-registers. [`InMemoryHost`] is the shipped host used by
//! tests and embedders that dispatch requests themselves.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::route::key::RouteKey;
use crate::value::FilePart;

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// HTTP method a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Plain GET: sync fetches and query-string events.
    Get,
    /// Multipart POST: file uploads and form submissions.
    Post,
}

/// The slice of an HTTP request a widget handler needs.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Query-string parameters (or form fields for a POST).
    pub query: BTreeMap<String, String>,
    /// The multipart `file` part, when present.
    pub file: Option<FilePart>,
}

impl Request {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from query pairs.
    pub fn with_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let query = pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self { query, file: None }
    }

    /// Attach a multipart file part (builder).
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.file = Some(file);
        self
    }
}

/// The response a widget handler produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: String,
}

impl Response {
    /// A 200 response with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    /// A 500 response carrying an error message body.
    pub fn server_error(message: &str) -> Self {
        Self {
            status: 500,
            body: serde_json::json!({ "message": message }).to_string(),
        }
    }

    /// Parse the body as JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

// ---------------------------------------------------------------------------
// Route / RouteHost
// ---------------------------------------------------------------------------

/// A request handler. Runs to completion on the host's worker pool.
pub type Handler = Arc<dyn Fn(Request) -> Response + Send + Sync>;

/// A registered endpoint record.
#[derive(Clone)]
pub struct Route {
    /// The derived key (also the URL segment).
    pub key: RouteKey,
    /// Accepted method.
    pub method: Method,
    /// The handler closure.
    pub handler: Handler,
}

impl Route {
    /// Create a GET route.
    pub fn get(key: RouteKey, handler: Handler) -> Self {
        Self {
            key,
            method: Method::Get,
            handler,
        }
    }

    /// Create a POST route.
    pub fn post(key: RouteKey, handler: Handler) -> Self {
        Self {
            key,
            method: Method::Post,
            handler,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// The contract consumed from the host web framework.
pub trait RouteHost: Send + Sync {
    /// Keys of all currently registered routes.
    fn iter_routes(&self) -> Vec<RouteKey>;

    /// Register a route. Must be idempotent with respect to the key: adding
    /// a key that already exists is a no-op.
    fn add_route(&self, route: Route);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The facade widgets use to make their endpoints idempotently addable.
#[derive(Clone)]
pub struct Registry {
    host: Arc<dyn RouteHost>,
}

impl Registry {
    /// Wrap a host.
    pub fn new(host: Arc<dyn RouteHost>) -> Self {
        Self { host }
    }

    /// Whether a key is already registered.
    pub fn is_registered(&self, key: &RouteKey) -> bool {
        self.host.iter_routes().iter().any(|k| k == key)
    }

    /// Register the route only if its key is absent.
    ///
    /// Safe under concurrent callers: `add_route` is idempotent, so a racing
    /// duplicate registration collapses into one.
    pub fn ensure_route(&self, route: Route) {
        if self.is_registered(&route.key) {
            return;
        }
        tracing::debug!(key = %route.key, "registering endpoint");
        self.host.add_route(route);
    }

    /// Keys of all registered routes.
    pub fn routes(&self) -> Vec<RouteKey> {
        self.host.iter_routes()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.host.iter_routes())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InMemoryHost
// ---------------------------------------------------------------------------

/// A mutex-guarded route table implementing [`RouteHost`].
///
/// Doubles as a dispatcher for tests and for embedders that route requests
/// themselves.
#[derive(Default)]
pub struct InMemoryHost {
    routes: Mutex<BTreeMap<RouteKey, Route>>,
}

impl InMemoryHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a request to the route registered under `key`.
    ///
    /// Returns `None` when the key is unknown or the method does not match.
    pub fn dispatch(&self, key: &RouteKey, method: Method, request: Request) -> Option<Response> {
        let route = {
            let routes = self.routes.lock().expect("route table poisoned");
            routes.get(key).cloned()?
        };
        if route.method != method {
            return None;
        }
        Some((route.handler)(request))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.lock().expect("route table poisoned").len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteHost for InMemoryHost {
    fn iter_routes(&self) -> Vec<RouteKey> {
        self.routes
            .lock()
            .expect("route table poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn add_route(&self, route: Route) {
        let mut routes = self.routes.lock().expect("route table poisoned");
        routes.entry(route.key.clone()).or_insert(route);
    }
}

impl fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("routes", &self.iter_routes())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
