//! DropDown widget: a `<select>` with server-managed options.
//!
//! Options are `(value, title)` pairs rendered as `<option>` children. The
//! `change` event carries the selected value.

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
    OptionKey::Multiple,
    OptionKey::Size,
    OptionKey::OptionsMap,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct DropDownState {
    element: Element,
    id: String,
    choices: Vec<(String, String)>,
    selected: Option<String>,
    disabled: bool,
}

impl DropDownState {
    fn rebuild(&mut self) {
        self.element.clear_children();
        for (value, title) in &self.choices {
            let mut option = Element::new("option", format!("{}_{}", self.id, value))
                .with_property("value", value.clone())
                .with_text(title.clone());
            if self.selected.as_deref() == Some(value.as_str()) {
                option.add_boolean_attr("selected");
            }
            let _ = self.element.add_child(option);
        }
    }
}

impl WidgetState for DropDownState {
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
            if self.choices.iter().any(|(v, _)| v == value) {
                self.selected = Some(value.to_owned());
                self.rebuild();
            }
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            fields: vec![
                FieldBinding::value("selected"),
                FieldBinding::prop("disabled", "disabled"),
            ],
            events: vec![EventWiring {
                dom_event: "change",
                event: "change",
                capture: vec![FieldBinding::value("selected")],
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A drop-down selection list.
#[derive(Clone)]
pub struct DropDown {
    core: Core<DropDownState>,
}

impl DropDown {
    /// Create a drop-down and register its endpoints. An `options-map`
    /// construction option seeds the choice list.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);

        let choices = options
            .get(OptionKey::OptionsMap)
            .and_then(crate::options::OptionValue::as_map)
            .map(|m| {
                m.iter()
                    .map(|(v, t)| (v.clone(), t.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut element = Element::new("select", id);
        if disabled {
            element.add_boolean_attr("disabled");
        }
        let mut state = DropDownState {
            element,
            id: id.to_owned(),
            choices,
            selected: None,
            disabled,
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

    /// Add a choice. Duplicate values are rejected.
    pub fn add_option(&self, value: &str, title: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            if s.choices.iter().any(|(v, _)| v == value) {
                return Err(WidgetError::Validation(format!(
                    "option `{value}` already exists"
                )));
            }
            s.choices.push((value.to_owned(), title.to_owned()));
            s.rebuild();
            Ok(())
        })
    }

    /// Remove a choice; clears the selection if it pointed at the choice.
    pub fn remove_option(&self, value: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            let before = s.choices.len();
            s.choices.retain(|(v, _)| v != value);
            if s.choices.len() == before {
                return Err(WidgetError::Validation(format!(
                    "option `{value}` does not exist"
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
            if !s.choices.iter().any(|(v, _)| v == value) {
                return Err(WidgetError::Validation(format!(
                    "option `{value}` does not exist"
                )));
            }
            s.selected = Some(value.to_owned());
            s.rebuild();
            Ok(())
        })
    }

    /// Register the change callback.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("change", Arc::new(callback));
    }
}

impl WidgetHandle for DropDown {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for DropDown {
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
