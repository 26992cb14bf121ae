//! Pilots: programmatic clients for headless widget testing.
//!
//! A pilot stands in for the browser: it owns the transport a widget is
//! constructed with and offers high-level verbs — sync, fire an event,
//! upload a file, subscribe, emit — that exercise exactly the code paths a
//! real client would.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::event::EventOutcome;
use crate::route::{InMemoryHost, Method, Registry, Request, Response};
use crate::transport::{MessageBus, Polling, Push, SocketMessage, Transport};
use crate::value::FilePart;
use crate::widget::WidgetHandle;

// ---------------------------------------------------------------------------
// PollingPilot
// ---------------------------------------------------------------------------

/// A headless polling client over an in-memory route host.
///
/// # Examples
///
/// ```ignore
/// let pilot = PollingPilot::new();
/// let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new())?;
/// let props = pilot.sync(&btn);
/// assert_eq!(props["title"], json!("Push"));
/// ```
pub struct PollingPilot {
    host: Arc<InMemoryHost>,
    transport: Arc<dyn Transport>,
}

impl PollingPilot {
    /// Create a pilot with a fresh host and polling transport.
    pub fn new() -> Self {
        let host = Arc::new(InMemoryHost::new());
        let transport: Arc<dyn Transport> = Arc::new(Polling::new(Registry::new(host.clone())));
        Self { host, transport }
    }

    /// The transport to construct widgets with.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// The underlying route host.
    pub fn host(&self) -> &Arc<InMemoryHost> {
        &self.host
    }

    /// Poll a widget's sync endpoint once, as the client timer would.
    ///
    /// # Panics
    ///
    /// Panics if the widget's sync route is missing or returns non-JSON;
    /// both indicate a broken test setup.
    pub fn sync(&self, widget: &impl WidgetHandle) -> Map<String, Value> {
        let response = self
            .host
            .dispatch(&widget.props_route(), Method::Get, Request::new())
            .expect("sync route not registered");
        match response.body_json() {
            Some(Value::Object(map)) => map,
            _ => panic!("sync endpoint returned non-object body"),
        }
    }

    /// Fire a GET event with query parameters, as a DOM wiring would.
    pub fn fire<'a, I>(&self, widget: &impl WidgetHandle, event: &str, params: I) -> Response
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.host
            .dispatch(
                &widget.event_route(event),
                Method::Get,
                Request::with_query(params),
            )
            .expect("event route not registered")
    }

    /// POST a multipart upload to an event endpoint.
    pub fn upload(&self, widget: &impl WidgetHandle, event: &str, file: FilePart) -> Response {
        self.host
            .dispatch(
                &widget.event_route(event),
                Method::Post,
                Request::new().with_file(file),
            )
            .expect("upload route not registered")
    }
}

impl Default for PollingPilot {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PushPilot
// ---------------------------------------------------------------------------

/// A headless socket client over a message bus.
pub struct PushPilot {
    bus: Arc<MessageBus>,
    transport: Arc<dyn Transport>,
}

impl PushPilot {
    /// Create a pilot with a fresh bus and push transport.
    pub fn new() -> Self {
        let bus = Arc::new(MessageBus::new());
        let transport: Arc<dyn Transport> = Arc::new(Push::new(bus.clone()));
        Self { bus, transport }
    }

    /// The transport to construct widgets with.
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// The underlying bus.
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Subscribe to a widget's namespace.
    ///
    /// # Panics
    ///
    /// Panics if the namespace is unclaimed, which indicates the widget was
    /// constructed with a different transport.
    pub fn connect(&self, widget: &impl WidgetHandle) -> UnboundedReceiver<SocketMessage> {
        self.bus
            .subscribe(&widget.namespace())
            .expect("namespace not claimed")
    }

    /// Emit a `fire_<event>_event` message with a JSON payload.
    pub fn emit(
        &self,
        widget: &impl WidgetHandle,
        event: &str,
        payload: Value,
    ) -> Option<EventOutcome> {
        self.bus.client_emit(
            &widget.namespace(),
            &format!("fire_{event}_event"),
            &payload,
        )
    }
}

impl Default for PushPilot {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WidgetOptions;
    use crate::widgets::Button;
    use serde_json::json;

    #[test]
    fn polling_pilot_drives_a_button() {
        let pilot = PollingPilot::new();
        let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
        btn.on_click(|_, props| Ok(json!(props.get_str("title"))));

        let props = pilot.sync(&btn);
        assert_eq!(props["title"], json!("Push"));

        let resp = pilot.fire(&btn, "click", [("title", "Push")]);
        assert_eq!(resp.body_json().unwrap(), json!({"result": "Push"}));
    }

    #[test]
    fn push_pilot_round_trips() {
        let pilot = PushPilot::new();
        let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
        let mut rx = pilot.connect(&btn);

        let outcome = pilot.emit(&btn, "click", json!({"title": "Go"}));
        assert_eq!(outcome, Some(EventOutcome::NoHandler));

        let sync = rx.try_recv().unwrap();
        assert_eq!(sync.event, "sync_properties_b");
        assert_eq!(sync.payload["title"], json!("Go"));
    }
}
