//! The push transport.
//!
//! Each widget claims a namespace derived from its primary event key. Clients
//! subscribe to the namespace and receive `sync_properties_<id>` messages the
//! moment server state changes; DOM events travel the other way as
//! `fire_<event>_event` messages. Commands skip the queue entirely and are
//! emitted as soon as they are published.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::event::EventOutcome;
use crate::transport::command::Command;
use crate::transport::script::push_script;
use crate::transport::{Transport, TransportKind};
use crate::value::EventProps;
use crate::widget::{Channel, Include};

/// A message on a widget namespace, in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketMessage {
    /// Message name, e.g. `sync_properties_b1` or `error`.
    pub event: String,
    /// JSON payload.
    pub payload: Value,
}

impl SocketMessage {
    /// Create a message.
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

struct NamespaceEntry {
    channel: Channel,
    subscribers: Vec<UnboundedSender<SocketMessage>>,
}

// ---------------------------------------------------------------------------
// MessageBus
// ---------------------------------------------------------------------------

/// The namespaced message fabric behind the push transport.
///
/// Stands in for the socket server: namespaces map to widget channels,
/// subscribers receive every message emitted on their namespace.
#[derive(Default)]
pub struct MessageBus {
    namespaces: Mutex<HashMap<String, NamespaceEntry>>,
}

impl MessageBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a namespace for a channel. Claiming an already-claimed
    /// namespace is a no-op, which makes widget construction idempotent.
    pub fn register(&self, namespace: &str, channel: Channel) {
        let mut namespaces = self.namespaces.lock().expect("bus poisoned");
        namespaces
            .entry(namespace.to_owned())
            .or_insert_with(|| {
                tracing::debug!(namespace, "claiming push namespace");
                NamespaceEntry {
                    channel,
                    subscribers: Vec::new(),
                }
            });
    }

    /// Whether a namespace has been claimed.
    pub fn is_registered(&self, namespace: &str) -> bool {
        self.namespaces
            .lock()
            .expect("bus poisoned")
            .contains_key(namespace)
    }

    /// Subscribe to a namespace. Returns `None` when the namespace is
    /// unclaimed.
    pub fn subscribe(&self, namespace: &str) -> Option<UnboundedReceiver<SocketMessage>> {
        let mut namespaces = self.namespaces.lock().expect("bus poisoned");
        let entry = namespaces.get_mut(namespace)?;
        let (tx, rx) = mpsc::unbounded_channel();
        entry.subscribers.push(tx);
        Some(rx)
    }

    /// Emit a message to every live subscriber of a namespace.
    pub fn emit(&self, namespace: &str, message: SocketMessage) {
        let mut namespaces = self.namespaces.lock().expect("bus poisoned");
        if let Some(entry) = namespaces.get_mut(namespace) {
            entry
                .subscribers
                .retain(|tx| tx.send(message.clone()).is_ok());
        }
    }

    /// Deliver a client-originated `fire_<event>_event` message.
    ///
    /// Applies the payload to widget state, runs the callback, emits the
    /// refreshed `sync_properties_<id>` snapshot, then an outcome message:
    /// `success`, `warning` (no callback), or `error` (callback failed).
    /// Returns `None` for an unclaimed namespace or a malformed message name.
    pub fn client_emit(
        &self,
        namespace: &str,
        message: &str,
        payload: &Value,
    ) -> Option<EventOutcome> {
        let event = message
            .strip_prefix("fire_")
            .and_then(|rest| rest.strip_suffix("_event"))?
            .to_owned();
        let channel = {
            let namespaces = self.namespaces.lock().expect("bus poisoned");
            namespaces.get(namespace)?.channel.clone()
        };
        let props = EventProps::from_json(payload);
        let outcome = channel.dispatch(&event, props);

        self.emit(
            namespace,
            SocketMessage::new(
                format!("sync_properties_{}", channel.widget_id()),
                Value::Object(channel.observable()),
            ),
        );
        let ack = match &outcome {
            EventOutcome::Success(value) => {
                SocketMessage::new("success", json!({ "result": value }))
            }
            EventOutcome::NoHandler => SocketMessage::new(
                "warning",
                json!({ "message": format!("no callback for event '{event}'") }),
            ),
            EventOutcome::Failed(message) => {
                SocketMessage::new("error", json!({ "message": message }))
            }
        };
        self.emit(namespace, ack);
        Some(outcome)
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let namespaces = self.namespaces.lock().expect("bus poisoned");
        f.debug_struct("MessageBus")
            .field("namespaces", &namespaces.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Immediate server-push over a [`MessageBus`].
#[derive(Debug, Clone)]
pub struct Push {
    bus: Arc<MessageBus>,
    runtime_url: String,
}

/// Default URL of the client socket runtime include.
pub const SOCKET_RUNTIME_URL: &str = "/static/webloom-socket.js";

impl Push {
    /// Create a push transport over a bus.
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            runtime_url: SOCKET_RUNTIME_URL.to_owned(),
        }
    }

    /// Override the socket runtime include URL (builder).
    pub fn with_runtime_url(mut self, url: impl Into<String>) -> Self {
        self.runtime_url = url.into();
        self
    }

    /// The underlying bus.
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }
}

impl Transport for Push {
    fn kind(&self) -> TransportKind {
        TransportKind::Push
    }

    fn attach(&self, channel: &Channel) {
        self.bus.register(&channel.namespace(), channel.clone());
    }

    fn publish_state(&self, channel: &Channel) {
        self.bus.emit(
            &channel.namespace(),
            SocketMessage::new(
                format!("sync_properties_{}", channel.widget_id()),
                Value::Object(channel.observable()),
            ),
        );
    }

    fn publish_command(&self, channel: &Channel, command: Command) {
        // No queue: the command rides a sync message immediately.
        let mut payload = channel.observable();
        payload.extend(command.to_fields());
        self.bus.emit(
            &channel.namespace(),
            SocketMessage::new(
                format!("sync_properties_{}", channel.widget_id()),
                Value::Object(payload),
            ),
        );
    }

    fn adapter_script(&self, channel: &Channel) -> String {
        push_script(channel.widget_id(), &channel.namespace(), &channel.adapter())
    }

    fn includes(&self) -> Vec<Include> {
        vec![Include::js(self.runtime_url.clone())]
    }
}

// ===========================================================================
// Tests
// ===========================================================================
