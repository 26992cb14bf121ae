//! State synchronization transports.
//!
//! Two interchangeable transports keep widget state coherent with the
//! browser: [`Polling`] serves JSON over registered HTTP endpoints and lets
//! the client fetch on a timer, while [`Push`] sends messages over per-widget
//! namespaces the moment state changes. Widgets hold an `Arc<dyn Transport>`
//! and never know which one they got.

pub mod command;
pub mod polling;
pub mod push;
pub mod script;

use crate::widget::{Channel, Include};
use command::Command;

pub use polling::Polling;
pub use push::{MessageBus, Push, SocketMessage};

/// Which synchronization style a transport implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Client-initiated periodic fetch.
    Polling,
    /// Server-initiated message emit.
    Push,
}

/// The seam between widgets and their synchronization mechanism.
///
/// `attach` is called once from the widget constructor and must be
/// idempotent: constructing the same widget id twice registers its endpoints
/// or namespace exactly once.
pub trait Transport: Send + Sync {
    /// The transport's style.
    fn kind(&self) -> TransportKind;

    /// Register the channel's endpoints or namespace.
    fn attach(&self, channel: &Channel);

    /// Propagate a server-side state change to connected clients.
    ///
    /// Polling does nothing here (the next poll picks the change up); push
    /// emits a `sync_properties_<id>` message immediately.
    fn publish_state(&self, channel: &Channel);

    /// Propagate a command. Polling queues it for the next poll; push emits
    /// it immediately.
    fn publish_command(&self, channel: &Channel, command: Command);

    /// The inline client adapter script for the channel's widget.
    fn adapter_script(&self, channel: &Channel) -> String;

    /// Page-level includes this transport needs (e.g. the socket runtime).
    fn includes(&self) -> Vec<Include> {
        Vec::new()
    }
}
