//! Dialog widget: a modal panel opened and closed by command.
//!
//! Opening and closing are server-originated [`Command`]s: on polling they
//! queue and the next sync delivers exactly one, so a dialog opened and
//! closed twice plays back in order without replays. The client reports a
//! user-dismissed dialog through the `close` event.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::{CallbackError, WidgetError};
use crate::event::EventSpec;
use crate::options::{OptionKey, WidgetOptions};
use crate::transport::command::Command;
use crate::transport::script::{AdapterSpec, EventWiring};
use crate::transport::Transport;
use crate::value::EventProps;
use crate::widget::{Channel, Include, Render, WidgetHandle, WidgetState};
use crate::widgets::Core;

const SUPPORTED: &[OptionKey] = &[
    OptionKey::Description,
    OptionKey::PropertiesMap,
    OptionKey::StyleMap,
    OptionKey::AttributesList,
    OptionKey::CssClassesList,
    OptionKey::Title,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct DialogState {
    element: Element,
    title: String,
    visible: bool,
}

impl WidgetState for DialogState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".into(), json!(self.title));
        map.insert("visible".into(), json!(self.visible));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        // The client only reports dismissal.
        if props.get_bool("visible") == Some(false) {
            self.visible = false;
            self.element.add_style("display", "none");
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            events: vec![EventWiring {
                dom_event: "close",
                event: "close",
                capture: Vec::new(),
            }],
            command_js: Some(concat!(
                "                    if (props.cmd === 'OPEN') { el.style.display = 'block'; }\n",
                "                    if (props.cmd === 'CLOSE') { el.style.display = 'none'; }",
            )
            .to_owned()),
            ..AdapterSpec::new()
        }
    }
}

/// A modal dialog.
#[derive(Clone)]
pub struct Dialog {
    core: Core<DialogState>,
}

impl Dialog {
    /// Create a dialog (initially hidden) and register its endpoints.
    pub fn new(
        id: &str,
        title: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;

        let mut element = Element::new("div", id).with_style("display", "none");
        element.add_css_class("dialog");
        let header = Element::new("div", format!("{id}_title")).with_text(title.to_owned());
        let body = Element::new("div", format!("{id}_body"));
        element.add_child(header)?;
        element.add_child(body)?;
        options.apply_common(&mut element);

        let state = DialogState {
            element,
            title: title.to_owned(),
            visible: false,
        };
        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::get("close")],
            transport,
        );
        Ok(Self { core })
    }

    /// The dialog title.
    pub fn title(&self) -> String {
        self.core.read(|s| s.title.clone())
    }

    /// Set the title and publish the change.
    pub fn set_title(&self, title: &str) {
        let header_id = format!("{}_title", self.widget_id());
        self.core.update(|s| {
            s.title = title.to_owned();
            if let Some(header) = s.element.child_mut(&header_id) {
                header.set_text(title);
            }
        });
    }

    /// Whether the dialog is currently open.
    pub fn is_open(&self) -> bool {
        self.core.read(|s| s.visible)
    }

    /// Open the dialog: flips state and issues an `OPEN` command.
    pub fn open(&self) {
        self.core.update(|s| {
            s.visible = true;
            s.element.remove_style("display");
        });
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("OPEN"));
    }

    /// Close the dialog: flips state and issues a `CLOSE` command.
    pub fn close(&self) {
        self.core.update(|s| {
            s.visible = false;
            s.element.add_style("display", "none");
        });
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("CLOSE"));
    }

    /// Add a child to the dialog body.
    pub fn add_child(&self, child: Element) -> Result<(), WidgetError> {
        let body_id = format!("{}_body", self.widget_id());
        self.core.update(|s| {
            s.element
                .child_mut(&body_id)
                .map(|body| body.add_child(child))
                .unwrap_or_else(|| {
                    Err(WidgetError::NotAChild(body_id.clone(), "dialog".to_owned()))
                })
        })
    }

    /// Register the close callback (fires when the user dismisses).
    pub fn on_close<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("close", Arc::new(callback));
    }
}

impl WidgetHandle for Dialog {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Dialog {
    fn render(&self) -> String {
        self.core.render_html()
    }

    fn includes(&self) -> Vec<Include> {
        self.core.include_manifest()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
