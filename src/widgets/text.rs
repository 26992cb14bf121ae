//! TextBox widget: a single-line text input.
//!
//! The `change` event carries the typed value; `readonly` and `disabled` are
//! both observable, and either one makes the state ignore inbound deltas.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::{CallbackError, WidgetError};
use crate::event::EventSpec;
use crate::options::{OptionKey, WidgetOptions};
use crate::transport::script::{AdapterSpec, EventWiring, FieldBinding};
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
    OptionKey::Disabled,
    OptionKey::Readonly,
    OptionKey::Required,
    OptionKey::Value,
    OptionKey::Size,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct TextBoxState {
    element: Element,
    text: String,
    disabled: bool,
    readonly: bool,
}

impl TextBoxState {
    fn frozen(&self) -> bool {
        self.disabled || self.readonly
    }
}

impl WidgetState for TextBoxState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("text".into(), json!(self.text));
        map.insert("disabled".into(), json!(self.disabled));
        map.insert("readonly".into(), json!(self.readonly));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.frozen() {
            return;
        }
        if let Some(text) = props.get_str("text") {
            self.text = text.to_owned();
            self.element.set_property("value", text);
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            fields: vec![
                FieldBinding::value("text"),
                FieldBinding::prop("disabled", "disabled"),
                FieldBinding::prop("readonly", "readOnly"),
            ],
            events: vec![EventWiring {
                dom_event: "change",
                event: "change",
                capture: vec![FieldBinding::value("text")],
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A single-line text input.
#[derive(Clone)]
pub struct TextBox {
    core: Core<TextBoxState>,
}

impl TextBox {
    /// Create a text box and register its endpoints.
    pub fn new(
        id: &str,
        text: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);
        let readonly = options.flag(OptionKey::Readonly).unwrap_or(false);

        let mut element = Element::new("input", id)
            .with_property("type", "text")
            .with_property("value", text);
        if disabled {
            element.add_boolean_attr("disabled");
        }
        if readonly {
            element.add_boolean_attr("readonly");
        }
        if options.flag(OptionKey::Required).unwrap_or(false) {
            element.add_boolean_attr("required");
        }
        if let Some(size) = options.number(OptionKey::Size) {
            element.set_property("size", format!("{}", size as u64));
        }
        options.apply_common(&mut element);

        let state = TextBoxState {
            element,
            text: text.to_owned(),
            disabled,
            readonly,
        };
        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::get("change")],
            transport,
        );
        Ok(Self { core })
    }

    /// The current text.
    pub fn text(&self) -> String {
        self.core.read(|s| s.text.clone())
    }

    /// Set the text and publish the change.
    pub fn set_text(&self, text: &str) {
        self.core.update(|s| {
            s.text = text.to_owned();
            s.element.set_property("value", text);
        });
    }

    /// Whether the text box is read-only.
    pub fn is_readonly(&self) -> bool {
        self.core.read(|s| s.readonly)
    }

    /// Set the read-only flag and publish the change.
    pub fn set_readonly(&self, readonly: bool) {
        self.core.update(|s| {
            s.readonly = readonly;
            s.element.set_boolean_attr("readonly", readonly);
        });
    }

    /// Whether the text box is disabled.
    pub fn is_disabled(&self) -> bool {
        self.core.read(|s| s.disabled)
    }

    /// Set the disabled flag and publish the change.
    pub fn set_disabled(&self, disabled: bool) {
        self.core.update(|s| {
            s.disabled = disabled;
            s.element.set_boolean_attr("disabled", disabled);
        });
    }

    /// Register the change callback.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("change", Arc::new(callback));
    }
}

impl WidgetHandle for TextBox {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for TextBox {
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
