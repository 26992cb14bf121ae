//! Event callbacks and dispatch outcomes.
//!
//! A widget registers server callbacks per event name. When a DOM event
//! arrives (over either transport), the widget state absorbs the property
//! snapshot first, then the callback fires with `(source_id, props)`. The
//! [`EventOutcome`] tells the transport what to report back to the client.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::CallbackError;
use crate::route::Method;
use crate::value::EventProps;

/// A user event callback: `(source widget id, property snapshot)` in, JSON
/// result out. Errors surface to the client as the transport's error shape.
pub type Callback =
    Arc<dyn Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync>;

/// Shared per-widget callback table, keyed by event name.
pub type CallbackMap = Arc<Mutex<BTreeMap<String, Callback>>>;

// ---------------------------------------------------------------------------
// EventSpec
// ---------------------------------------------------------------------------

/// An event a widget registers with its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    /// Event name; also the endpoint suffix and the `fire_<name>_event`
    /// message name.
    pub name: &'static str,
    /// HTTP method for the polling endpoint (POST for multipart/form).
    pub method: Method,
}

impl EventSpec {
    /// A query-string GET event.
    pub const fn get(name: &'static str) -> Self {
        Self {
            name,
            method: Method::Get,
        }
    }

    /// A POST event (multipart upload or form submission).
    pub const fn post(name: &'static str) -> Self {
        Self {
            name,
            method: Method::Post,
        }
    }
}

// ---------------------------------------------------------------------------
// EventOutcome
// ---------------------------------------------------------------------------

/// The result of delivering one event to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The callback ran and returned a value.
    Success(Value),
    /// No callback is registered for the event. State writes still happened.
    NoHandler,
    /// The callback failed. State writes made before it ran are preserved.
    Failed(String),
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_spec_constructors() {
        let click = EventSpec::get("click");
        assert_eq!(click.name, "click");
        assert_eq!(click.method, Method::Get);

        let submit = EventSpec::post("submit");
        assert_eq!(submit.method, Method::Post);
    }

    #[test]
    fn callback_map_shared_across_clones() {
        let map: CallbackMap = Arc::new(Mutex::new(BTreeMap::new()));
        let clone = Arc::clone(&map);
        clone.lock().unwrap().insert(
            "click".to_owned(),
            Arc::new(|_: &str, _: &EventProps| Ok(Value::Null)) as Callback,
        );
        assert!(map.lock().unwrap().contains_key("click"));
    }

    #[test]
    fn outcome_equality() {
        assert_eq!(EventOutcome::NoHandler, EventOutcome::NoHandler);
        assert_ne!(
            EventOutcome::Success(Value::Null),
            EventOutcome::Failed("x".into())
        );
    }
}
