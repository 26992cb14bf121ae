//! The widget contract shared by the whole catalog.
//!
//! A catalog widget is a cheap handle around shared state: the typed state
//! struct implements [`WidgetState`], and a [`Channel`] bundles everything a
//! transport needs to keep that state coherent with the browser — identity,
//! the state behind a mutex, the callback table, the command queue, and the
//! registered events. Constructing the same widget twice with the same id
//! derives the same channel addresses, which is what makes transport
//! attachment idempotent.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::error::CallbackError;
use crate::event::{Callback, CallbackMap, EventOutcome, EventSpec};
use crate::route::RouteKey;
use crate::transport::command::{Command, CommandQueue};
use crate::transport::script::AdapterSpec;
use crate::value::EventProps;

// ---------------------------------------------------------------------------
// WidgetState
// ---------------------------------------------------------------------------

/// Server-side state of one widget.
///
/// Implementations own an [`Element`](crate::element::Element) for markup and
/// whatever typed fields the widget needs. `apply_event` runs before the user
/// callback and is where inbound property snapshots are absorbed; a widget
/// whose `disabled` flag is set server-side must ignore payload deltas there.
pub trait WidgetState: Send + 'static {
    /// The underlying element.
    fn element(&self) -> &crate::element::Element;

    /// Mutable access to the underlying element.
    fn element_mut(&mut self) -> &mut crate::element::Element;

    /// The observable properties, as published to the client on every sync.
    fn observable(&self) -> Map<String, Value>;

    /// Absorb a DOM-side property snapshot. May enrich `props` (file upload
    /// inserts `filename` / `upload_path`) before the callback sees them.
    fn apply_event(&mut self, props: &mut EventProps);

    /// The client adapter declaration for this widget.
    fn adapter(&self) -> AdapterSpec;

    /// Third-party includes this widget's client adapter needs.
    fn dependencies(&self) -> Vec<Include> {
        Vec::new()
    }
}

/// Shared, lockable widget state as the transports see it.
pub type SharedState = Arc<Mutex<dyn WidgetState>>;

// ---------------------------------------------------------------------------
// Include
// ---------------------------------------------------------------------------

/// A script or stylesheet a page must load once for a widget to work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Include {
    /// A `<link rel='stylesheet'>` URL.
    Css(String),
    /// A `<script src>` URL.
    Js(String),
}

impl Include {
    /// A stylesheet include.
    pub fn css(url: impl Into<String>) -> Self {
        Include::Css(url.into())
    }

    /// A script include.
    pub fn js(url: impl Into<String>) -> Self {
        Include::Js(url.into())
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Anything that can contribute markup to a page.
pub trait Render: Send {
    /// Produce the HTML fragment (markup plus any inline adapter script).
    fn render(&self) -> String;

    /// Includes required by this fragment and its descendants.
    fn includes(&self) -> Vec<Include> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// The transport-facing bundle for one widget.
#[derive(Clone)]
pub struct Channel {
    module: &'static str,
    id: String,
    state: SharedState,
    callbacks: CallbackMap,
    commands: CommandQueue,
    events: Vec<EventSpec>,
}

impl Channel {
    /// Create a channel. `module` should be the widget's `module_path!()`;
    /// `events` lists the events the transport will register.
    pub fn new(
        module: &'static str,
        id: impl Into<String>,
        state: SharedState,
        events: Vec<EventSpec>,
    ) -> Self {
        Self {
            module,
            id: id.into(),
            state,
            callbacks: Arc::new(Mutex::new(BTreeMap::new())),
            commands: CommandQueue::new(),
            events,
        }
    }

    /// The logical module name.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// The widget id.
    pub fn widget_id(&self) -> &str {
        &self.id
    }

    /// Events the widget registers.
    pub fn events(&self) -> &[EventSpec] {
        &self.events
    }

    /// The sync endpoint key: `{module}_{id}_props`.
    pub fn props_route(&self) -> RouteKey {
        RouteKey::derive(self.module, &self.id, Some("props"))
    }

    /// An event endpoint key: `{module}_{id}_{event}`.
    pub fn event_route(&self, event: &str) -> RouteKey {
        RouteKey::derive(self.module, &self.id, Some(event))
    }

    /// The push namespace, derived from the widget's primary event.
    pub fn namespace(&self) -> String {
        let primary = self.events.first().map_or("main", |e| e.name);
        RouteKey::derive(self.module, &self.id, Some(primary)).path()
    }

    // ── State access ─────────────────────────────────────────────────

    /// Snapshot the observable properties.
    pub fn observable(&self) -> Map<String, Value> {
        self.state.lock().expect("widget state poisoned").observable()
    }

    /// Snapshot the adapter declaration.
    pub fn adapter(&self) -> AdapterSpec {
        self.state.lock().expect("widget state poisoned").adapter()
    }

    /// Includes declared by the widget state.
    pub fn dependencies(&self) -> Vec<Include> {
        self.state
            .lock()
            .expect("widget state poisoned")
            .dependencies()
    }

    /// The observable snapshot with at most one queued command merged in.
    /// This is the polling sync payload; merging pops (acknowledges) the
    /// command.
    pub fn sync_payload(&self) -> Map<String, Value> {
        let mut payload = self.observable();
        if let Some(command) = self.commands.pop() {
            payload.extend(command.to_fields());
        }
        payload
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The widget's command queue.
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    /// Enqueue a command for the next poll to drain.
    pub fn queue_command(&self, command: Command) {
        self.commands.push(command);
    }

    // ── Callbacks ────────────────────────────────────────────────────

    /// Register (or replace) the callback for an event.
    pub fn register_callback(&self, event: &str, callback: Callback) {
        self.callbacks
            .lock()
            .expect("callback table poisoned")
            .insert(event.to_owned(), callback);
    }

    /// Whether a callback is registered for an event.
    pub fn has_callback(&self, event: &str) -> bool {
        self.callbacks
            .lock()
            .expect("callback table poisoned")
            .contains_key(event)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Deliver one event: absorb the snapshot into widget state, then invoke
    /// the user callback with `(source_id, props)`.
    ///
    /// The state lock is released before the callback runs. State writes are
    /// kept even when the callback fails or is missing.
    pub fn dispatch(&self, event: &str, mut props: EventProps) -> EventOutcome {
        {
            let mut state = self.state.lock().expect("widget state poisoned");
            state.apply_event(&mut props);
        }
        let callback = self
            .callbacks
            .lock()
            .expect("callback table poisoned")
            .get(event)
            .cloned();
        match callback {
            None => {
                tracing::warn!(widget = %self.id, event, "no callback registered");
                EventOutcome::NoHandler
            }
            Some(callback) => match callback(&self.id, &props) {
                Ok(value) => EventOutcome::Success(value),
                Err(CallbackError(message)) => {
                    tracing::error!(widget = %self.id, event, %message, "callback failed");
                    EventOutcome::Failed(message)
                }
            },
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("module", &self.module)
            .field("id", &self.id)
            .field("events", &self.events)
            .field("pending_commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// WidgetHandle
// ---------------------------------------------------------------------------

/// Convenience accessors shared by every catalog widget handle.
pub trait WidgetHandle {
    /// The widget's transport channel.
    fn channel(&self) -> &Channel;

    /// The widget id.
    fn widget_id(&self) -> &str {
        self.channel().widget_id()
    }

    /// The sync endpoint key.
    fn props_route(&self) -> RouteKey {
        self.channel().props_route()
    }

    /// An event endpoint key.
    fn event_route(&self, event: &str) -> RouteKey {
        self.channel().event_route(event)
    }

    /// The push namespace.
    fn namespace(&self) -> String {
        self.channel().namespace()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use serde_json::json;

    struct Field {
        element: Element,
        value: String,
        disabled: bool,
    }

    impl Field {
        fn new() -> Self {
            Self {
                element: Element::new("input", "p"),
                value: String::new(),
                disabled: false,
            }
        }
    }

    impl WidgetState for Field {
        fn element(&self) -> &Element {
            &self.element
        }
        fn element_mut(&mut self) -> &mut Element {
            &mut self.element
        }
        fn observable(&self) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("value".into(), json!(self.value));
            map.insert("disabled".into(), json!(self.disabled));
            map
        }
        fn apply_event(&mut self, props: &mut EventProps) {
            if self.disabled {
                return;
            }
            if let Some(v) = props.get_str("value") {
                self.value = v.to_owned();
            }
        }
        fn adapter(&self) -> AdapterSpec {
            AdapterSpec::new()
        }
    }

    fn channel() -> (Arc<Mutex<Field>>, Channel) {
        let state = Arc::new(Mutex::new(Field::new()));
        let shared: SharedState = state.clone();
        let channel = Channel::new("app.widgets", "p", shared, vec![EventSpec::get("change")]);
        (state, channel)
    }

    #[test]
    fn routes_and_namespace() {
        let (_, ch) = channel();
        assert_eq!(ch.props_route().as_str(), "app_widgets_p_props");
        assert_eq!(ch.event_route("change").as_str(), "app_widgets_p_change");
        assert_eq!(ch.namespace(), "/app_widgets_p_change");
    }

    #[test]
    fn dispatch_applies_then_calls_back() {
        let (state, ch) = channel();
        ch.register_callback(
            "change",
            Arc::new(|source, props| {
                assert_eq!(source, "p");
                Ok(json!(props.get_str("value")))
            }),
        );
        let mut props = EventProps::new();
        props.insert("value", "42");
        let outcome = ch.dispatch("change", props);
        assert_eq!(outcome, EventOutcome::Success(json!("42")));
        assert_eq!(state.lock().unwrap().value, "42");
    }

    #[test]
    fn dispatch_without_callback_still_writes_state() {
        let (state, ch) = channel();
        let mut props = EventProps::new();
        props.insert("value", "kept");
        assert_eq!(ch.dispatch("change", props), EventOutcome::NoHandler);
        assert_eq!(state.lock().unwrap().value, "kept");
    }

    #[test]
    fn dispatch_failure_preserves_state_writes() {
        let (state, ch) = channel();
        ch.register_callback("change", Arc::new(|_, _| Err("boom".into())));
        let mut props = EventProps::new();
        props.insert("value", "kept");
        assert_eq!(
            ch.dispatch("change", props),
            EventOutcome::Failed("boom".into())
        );
        assert_eq!(state.lock().unwrap().value, "kept");
    }

    #[test]
    fn disabled_state_ignores_deltas() {
        let (state, ch) = channel();
        state.lock().unwrap().disabled = true;
        let mut props = EventProps::new();
        props.insert("value", "rejected");
        ch.dispatch("change", props);
        assert_eq!(state.lock().unwrap().value, "");
    }

    #[test]
    fn sync_payload_merges_one_command() {
        let (_, ch) = channel();
        ch.queue_command(Command::new("OPEN"));
        ch.queue_command(Command::new("CLOSE"));

        let first = ch.sync_payload();
        assert_eq!(first["cmd"], json!("OPEN"));
        let second = ch.sync_payload();
        assert_eq!(second["cmd"], json!("CLOSE"));
        // Queue drained: plain observable payload, no replay.
        let third = ch.sync_payload();
        assert!(!third.contains_key("cmd"));
    }

    #[test]
    fn register_callback_replaces() {
        let (_, ch) = channel();
        ch.register_callback("change", Arc::new(|_, _| Ok(json!(1))));
        ch.register_callback("change", Arc::new(|_, _| Ok(json!(2))));
        assert!(ch.has_callback("change"));
        let outcome = ch.dispatch("change", EventProps::new());
        assert_eq!(outcome, EventOutcome::Success(json!(2)));
    }
}
