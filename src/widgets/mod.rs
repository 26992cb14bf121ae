//! The widget catalog.
//!
//! Every catalog widget is a clonable handle over shared state plus a
//! transport. The [`Core`] bundle centralizes the construction dance —
//! build state, wrap it in a channel, attach the transport — and the
//! state-then-publish discipline every setter follows.

pub mod button;
pub mod checkbox;
pub mod dialog;
pub mod dropdown;
pub mod file;
pub mod form;
pub mod grid;
pub mod panel;
pub mod radio;
pub mod slider;
pub mod text;
pub mod toolbar;
pub mod tree;

pub use button::Button;
pub use checkbox::CheckBox;
pub use dialog::Dialog;
pub use dropdown::DropDown;
pub use file::FileUpload;
pub use form::Form;
pub use grid::{Column, Grid};
pub use panel::Panel;
pub use radio::RadioGroup;
pub use slider::Slider;
pub use text::TextBox;
pub use toolbar::{Toolbar, ToolbarItem};
pub use tree::{Tree, TreeNodeKey};

use std::sync::{Arc, Mutex};

use crate::event::{Callback, EventSpec};
use crate::transport::Transport;
use crate::widget::{Channel, Include, WidgetState};

/// The shared plumbing behind a catalog widget handle.
///
/// Holds the typed state (widgets read and write through it), the channel
/// (the transports' erased view of the same state), and the transport.
/// Cloning a widget handle clones the `Core`; all clones share state.
pub(crate) struct Core<S: WidgetState> {
    state: Arc<Mutex<S>>,
    channel: Channel,
    transport: Arc<dyn Transport>,
}

impl<S: WidgetState> Core<S> {
    /// Build the core and attach the transport. `attach` is idempotent, so
    /// constructing the same widget id twice is safe.
    pub(crate) fn attach(
        module: &'static str,
        id: &str,
        state: S,
        events: Vec<EventSpec>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let state = Arc::new(Mutex::new(state));
        let channel = Channel::new(module, id, state.clone(), events);
        transport.attach(&channel);
        Self {
            state,
            channel,
            transport,
        }
    }

    pub(crate) fn channel(&self) -> &Channel {
        &self.channel
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Read through the state lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.lock().expect("widget state poisoned"))
    }

    /// Mutate through the state lock, then publish the new state.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut state = self.state.lock().expect("widget state poisoned");
            f(&mut state)
        };
        self.transport.publish_state(&self.channel);
        result
    }

    /// Register a user callback for an event.
    pub(crate) fn on(&self, event: &str, callback: Callback) {
        self.channel.register_callback(event, callback);
    }

    /// Markup plus the inline adapter script.
    pub(crate) fn render_html(&self) -> String {
        let markup = self.read(|s| s.element().render());
        format!("{markup}\n{}", self.transport.adapter_script(&self.channel))
    }

    /// Widget includes plus transport includes, deduplicated.
    pub(crate) fn include_manifest(&self) -> Vec<Include> {
        let mut manifest = self.channel.dependencies();
        for include in self.transport.includes() {
            if !manifest.contains(&include) {
                manifest.push(include);
            }
        }
        manifest
    }
}

impl<S: WidgetState> Clone for Core<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            channel: self.channel.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<S: WidgetState> std::fmt::Debug for Core<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use crate::route::{InMemoryHost, Registry};
    use crate::transport::{MessageBus, Polling, Push, Transport};

    /// A polling transport over a fresh in-memory host.
    pub(crate) fn polling() -> (Arc<InMemoryHost>, Arc<dyn Transport>) {
        let host = Arc::new(InMemoryHost::new());
        let transport = Polling::new(Registry::new(host.clone()));
        (host, Arc::new(transport))
    }

    /// A push transport over a fresh bus.
    pub(crate) fn push() -> (Arc<MessageBus>, Arc<dyn Transport>) {
        let bus = Arc::new(MessageBus::new());
        let transport = Push::new(bus.clone());
        (bus, Arc::new(transport))
    }
}
