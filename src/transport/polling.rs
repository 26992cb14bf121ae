//! The polling transport.
//!
//! Registers per-widget HTTP endpoints through the [`Registry`] facade and
//! leaves the rest to the client, which fetches the sync endpoint on a timer.
//! State changes need no server action here: the next poll observes them.
//! Commands are queued and drained one per poll by merging into the sync
//! payload.

use std::sync::Arc;

use serde_json::json;

use crate::event::EventOutcome;
use crate::route::{Method, Registry, Request, Response, Route};
use crate::transport::command::Command;
use crate::transport::script::polling_script;
use crate::transport::{Transport, TransportKind};
use crate::value::EventProps;
use crate::widget::Channel;

/// HTTP polling over registered endpoints.
#[derive(Debug, Clone)]
pub struct Polling {
    registry: Registry,
}

impl Polling {
    /// Create a polling transport over an endpoint registry.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The wrapped registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn sync_handler(channel: Channel) -> Route {
        let key = channel.props_route();
        Route::get(
            key,
            Arc::new(move |_req: Request| {
                Response::json(&serde_json::Value::Object(channel.sync_payload()))
            }),
        )
    }

    fn event_handler(channel: Channel, event: &'static str, method: Method) -> Route {
        let key = channel.event_route(event);
        let handler = Arc::new(move |req: Request| {
            let mut props = EventProps::from_query(
                req.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            if let Some(file) = req.file {
                props = props.with_file(file);
            }
            match channel.dispatch(event, props) {
                EventOutcome::Success(value) => Response::json(&json!({ "result": value })),
                EventOutcome::NoHandler => Response::json(&json!({ "result": null })),
                EventOutcome::Failed(message) => Response::server_error(&message),
            }
        });
        match method {
            Method::Get => Route::get(key, handler),
            Method::Post => Route::post(key, handler),
        }
    }
}

impl Transport for Polling {
    fn kind(&self) -> TransportKind {
        TransportKind::Polling
    }

    fn attach(&self, channel: &Channel) {
        self.registry.ensure_route(Self::sync_handler(channel.clone()));
        for spec in channel.events().to_vec() {
            self.registry
                .ensure_route(Self::event_handler(channel.clone(), spec.name, spec.method));
        }
    }

    fn publish_state(&self, _channel: &Channel) {
        // Nothing to do: the client's next poll observes the new state.
    }

    fn publish_command(&self, channel: &Channel, command: Command) {
        channel.queue_command(command);
    }

    fn adapter_script(&self, channel: &Channel) -> String {
        polling_script(channel.widget_id(), &channel.props_route(), &channel.adapter())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
