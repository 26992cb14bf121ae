//! Form widget: a `<form>` that posts all of its field values at once.
//!
//! Child fields are plain elements added to the form; on submit, every field
//! value arrives in a single snapshot, which the form records as the last
//! submission before the callback runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::{CallbackError, WidgetError};
use crate::event::EventSpec;
use crate::options::{OptionKey, WidgetOptions};
use crate::transport::script::AdapterSpec;
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
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct FormState {
    element: Element,
    submitted: BTreeMap<String, String>,
    disabled: bool,
}

impl WidgetState for FormState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("disabled".into(), json!(self.disabled));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        self.submitted = props
            .iter()
            .map(|(k, v)| {
                let text = match v.to_json() {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k.to_owned(), text)
            })
            .collect();
    }

    fn adapter(&self) -> AdapterSpec {
        // Submission serializes the form's own fields; no per-field wiring.
        AdapterSpec::new()
    }
}

/// A form that submits all of its fields in one event.
#[derive(Clone)]
pub struct Form {
    core: Core<FormState>,
}

impl Form {
    /// Create a form and register its endpoints. The submit endpoint accepts
    /// POST with the field values as form parameters.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);

        let mut element = Element::new("form", id);
        options.apply_common(&mut element);

        let state = FormState {
            element,
            submitted: BTreeMap::new(),
            disabled,
        };
        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::post("submit")],
            transport,
        );
        Ok(Self { core })
    }

    /// Add a field element to the form.
    pub fn add_field(&self, field: Element) -> Result<(), WidgetError> {
        self.core.update(|s| s.element.add_child(field))
    }

    /// Remove a field element by id.
    pub fn remove_field(&self, field_id: &str) -> Result<Element, WidgetError> {
        self.core.update(|s| s.element.remove_child(field_id))
    }

    /// The field values from the most recent submission.
    pub fn submitted(&self) -> BTreeMap<String, String> {
        self.core.read(|s| s.submitted.clone())
    }

    /// Register the submit callback.
    pub fn on_submit<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("submit", Arc::new(callback));
    }
}

impl WidgetHandle for Form {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Form {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Method, Request};
    use crate::widgets::testutil;

    #[test]
    fn renders_fields_in_order() {
        let (_, transport) = testutil::polling();
        let form = Form::new("f", transport, &WidgetOptions::new()).unwrap();
        form.add_field(
            Element::new("input", "u")
                .with_property("type", "text"),
        )
        .unwrap();
        form.add_field(
            Element::new("input", "v")
                .with_property("type", "text"),
        )
        .unwrap();
        let html = form.render();
        assert!(html.contains("<form id='f'"));
        assert!(html.find("id='u'").unwrap() < html.find("id='v'").unwrap());
    }

    #[test]
    fn duplicate_field_rejected() {
        let (_, transport) = testutil::polling();
        let form = Form::new("f", transport, &WidgetOptions::new()).unwrap();
        form.add_field(Element::new("input", "u")).unwrap();
        assert!(form.add_field(Element::new("input", "u")).is_err());
    }

    #[test]
    fn submit_records_all_field_values() {
        let (host, transport) = testutil::polling();
        let form = Form::new("f", transport, &WidgetOptions::new()).unwrap();
        form.on_submit(|_, props| Ok(props.to_json()));
        let resp = host
            .dispatch(
                &form.event_route("submit"),
                Method::Post,
                Request::with_query([("u", "1"), ("v", "2")]),
            )
            .unwrap();
        assert_eq!(
            resp.body_json().unwrap(),
            json!({"result": {"u": "1", "v": "2"}})
        );
        let submitted = form.submitted();
        assert_eq!(submitted.get("u").map(String::as_str), Some("1"));
        assert_eq!(submitted.get("v").map(String::as_str), Some("2"));
    }

    #[test]
    fn remove_field_detaches() {
        let (_, transport) = testutil::polling();
        let form = Form::new("f", transport, &WidgetOptions::new()).unwrap();
        form.add_field(Element::new("input", "u")).unwrap();
        let field = form.remove_field("u").unwrap();
        assert!(field.parent().is_none());
        assert!(form.remove_field("u").is_err());
    }
}
