//! Endpoint addressing: route keys, the registry facade, in-memory host.

pub mod key;
pub mod registry;

pub use key::RouteKey;
pub use registry::{Handler, InMemoryHost, Method, Registry, Request, Response, Route, RouteHost};
