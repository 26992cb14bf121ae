//! RadioGroup widget: a set of mutually exclusive radio buttons.
//!
//! Items are `(value, title)` pairs rendered as `<input type='radio'>`
//! children of a wrapping `<div>`. The `change` event carries the selected
//! value; selecting server-side publishes it back out.

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
    OptionKey::Orientation,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct RadioGroupState {
    element: Element,
    group: String,
    items: Vec<(String, String)>,
    selected: Option<String>,
    disabled: bool,
    vertical: bool,
}

impl RadioGroupState {
    fn rebuild(&mut self) {
        self.element.clear_children();
        for (value, title) in &self.items {
            let item_id = format!("{}_{}", self.group, value);
            let mut input = Element::new("input", item_id.clone())
                .with_property("type", "radio")
                .with_property("value", value.clone());
            if self.selected.as_deref() == Some(value.as_str()) {
                input.add_boolean_attr("checked");
            }
            if self.disabled {
                input.add_boolean_attr("disabled");
            }
            let label = Element::new("label", format!("{item_id}_lbl")).with_text(title.clone());
            // Ids are derived from item values, which are unique by insert.
            let _ = self.element.add_child(input);
            let _ = self.element.add_child(label);
            if self.vertical {
                let _ = self.element.add_child(Element::new("br", format!("{item_id}_br")));
            }
        }
    }
}

impl WidgetState for RadioGroupState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("selected".into(), json!(self.selected));
        map.insert("disabled".into(), json!(self.disabled));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        if let Some(value) = props.get_str("selected") {
            if self.items.iter().any(|(v, _)| v == value) {
                self.selected = Some(value.to_owned());
                self.rebuild();
            }
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            events: vec![EventWiring {
                dom_event: "change",
                event: "change",
                capture: vec![FieldBinding::value("selected")],
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A group of mutually exclusive radio buttons.
#[derive(Clone)]
pub struct RadioGroup {
    core: Core<RadioGroupState>,
}

impl RadioGroup {
    /// Create an empty radio group and register its endpoints.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);
        let vertical = match options.text(OptionKey::Orientation) {
            None | Some("horizontal") => false,
            Some("vertical") => true,
            Some(other) => {
                return Err(WidgetError::Validation(format!(
                    "orientation must be `horizontal` or `vertical`, got `{other}`"
                )))
            }
        };

        let mut element = Element::new("div", id);
        element.add_style("display", "inline-block");
        let mut state = RadioGroupState {
            element,
            group: id.to_owned(),
            items: Vec::new(),
            selected: None,
            disabled,
            vertical,
        };
        state.rebuild();
        options.apply_common(&mut state.element);

        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::get("change")],
            transport,
        );
        Ok(Self { core })
    }

    /// Add an item. Duplicate values are rejected.
    pub fn add_item(&self, value: &str, title: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            if s.items.iter().any(|(v, _)| v == value) {
                return Err(WidgetError::Validation(format!(
                    "radio item `{value}` already exists"
                )));
            }
            s.items.push((value.to_owned(), title.to_owned()));
            s.rebuild();
            Ok(())
        })
    }

    /// Remove an item; clears the selection if it pointed at the item.
    pub fn remove_item(&self, value: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            let before = s.items.len();
            s.items.retain(|(v, _)| v != value);
            if s.items.len() == before {
                return Err(WidgetError::Validation(format!(
                    "radio item `{value}` does not exist"
                )));
            }
            if s.selected.as_deref() == Some(value) {
                s.selected = None;
            }
            s.rebuild();
            Ok(())
        })
    }

    /// The selected value.
    pub fn selected(&self) -> Option<String> {
        self.core.read(|s| s.selected.clone())
    }

    /// Select a value server-side and publish the change.
    pub fn select(&self, value: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            if !s.items.iter().any(|(v, _)| v == value) {
                return Err(WidgetError::Validation(format!(
                    "radio item `{value}` does not exist"
                )));
            }
            s.selected = Some(value.to_owned());
            s.rebuild();
            Ok(())
        })
    }

    /// The items as `(value, title)` pairs.
    pub fn items(&self) -> Vec<(String, String)> {
        self.core.read(|s| s.items.clone())
    }

    /// Register the change callback.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("change", Arc::new(callback));
    }
}

impl WidgetHandle for RadioGroup {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for RadioGroup {
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
