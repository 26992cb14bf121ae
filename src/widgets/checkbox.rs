//! CheckBox widget: a labeled check box.
//!
//! Renders as an `<input type='checkbox'>` followed by a `<label>` bound to
//! it. The `click` event carries the checked flag as a native boolean on the
//! push transport and as a normalized `"true"`/`"false"` on the query string.

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
    OptionKey::Checked,
    OptionKey::Value,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct CheckBoxState {
    element: Element,
    title: String,
    value: String,
    checked: bool,
    disabled: bool,
}

impl WidgetState for CheckBoxState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".into(), json!(self.title));
        map.insert("value".into(), json!(self.value));
        map.insert("checked".into(), json!(self.checked));
        map.insert("disabled".into(), json!(self.disabled));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        if let Some(checked) = props.get_bool("checked") {
            self.checked = checked;
            self.element.set_boolean_attr("checked", checked);
        }
        // The server is authoritative for everything but the toggle; the
        // callback always sees the full four-key snapshot.
        props.insert("title", self.title.as_str());
        props.insert("value", self.value.as_str());
        props.insert("checked", self.checked);
        props.insert("disabled", self.disabled);
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            fields: vec![
                FieldBinding::prop("checked", "checked"),
                FieldBinding::prop("disabled", "disabled"),
                FieldBinding::value("value"),
            ],
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture: vec![
                    FieldBinding::prop("checked", "checked"),
                    FieldBinding::value("value"),
                    FieldBinding::prop("disabled", "disabled"),
                    FieldBinding::prop("title", "title"),
                ],
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A labeled check box.
#[derive(Clone)]
pub struct CheckBox {
    core: Core<CheckBoxState>,
}

impl CheckBox {
    /// Create a check box and register its endpoints.
    pub fn new(
        id: &str,
        title: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);
        let checked = options.flag(OptionKey::Checked).unwrap_or(false);
        // "on" is what an unadorned checkbox submits.
        let value = options.text(OptionKey::Value).unwrap_or("on").to_owned();

        let mut element = Element::new("input", id)
            .with_property("type", "checkbox")
            .with_property("value", value.clone());
        if checked {
            element.add_boolean_attr("checked");
        }
        if disabled {
            element.add_boolean_attr("disabled");
        }
        if options.flag(OptionKey::Readonly).unwrap_or(false) {
            element.add_boolean_attr("readonly");
        }
        options.apply_common(&mut element);

        let state = CheckBoxState {
            element,
            title: title.to_owned(),
            value,
            checked,
            disabled,
        };
        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::get("click")],
            transport,
        );
        Ok(Self { core })
    }

    /// Whether the box is checked.
    pub fn is_checked(&self) -> bool {
        self.core.read(|s| s.checked)
    }

    /// Set the checked flag and publish the change.
    pub fn set_checked(&self, checked: bool) {
        self.core.update(|s| {
            s.checked = checked;
            s.element.set_boolean_attr("checked", checked);
        });
    }

    /// The configured submit value.
    pub fn value(&self) -> String {
        self.core.read(|s| s.value.clone())
    }

    /// The label title.
    pub fn title(&self) -> String {
        self.core.read(|s| s.title.clone())
    }

    /// Set the label title and publish the change.
    pub fn set_title(&self, title: &str) {
        self.core.update(|s| s.title = title.to_owned());
    }

    /// Whether the box is disabled.
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

    /// Register the click callback.
    pub fn on_click<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("click", Arc::new(callback));
    }
}

impl WidgetHandle for CheckBox {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for CheckBox {
    fn render(&self) -> String {
        let (markup, title) = (
            self.core.read(|s| s.element.render()),
            self.core.read(|s| s.title.clone()),
        );
        let id = self.widget_id().to_owned();
        format!(
            "{markup}<label for='{id}'>{title}</label>\n{script}",
            script = self
                .core
                .transport()
                .adapter_script(self.core.channel()),
        )
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
    fn renders_checkbox_with_label() {
        let (_, transport) = testutil::polling();
        let cb = CheckBox::new("c", "Accept", transport, &WidgetOptions::new()).unwrap();
        let html = cb.render();
        assert!(html.contains("type='checkbox'"));
        assert!(html.contains("<label for='c'>Accept</label>"));
    }

    #[test]
    fn toggle_round_trip() {
        let (host, transport) = testutil::polling();
        let cb = CheckBox::new("c", "Accept", transport, &WidgetOptions::new()).unwrap();
        cb.on_click(|_, props| Ok(json!(props.get_bool("checked"))));

        let resp = host
            .dispatch(
                &cb.event_route("click"),
                Method::Get,
                Request::with_query([("checked", "true")]),
            )
            .unwrap();
        assert_eq!(resp.body_json().unwrap(), json!({"result": true}));
        assert!(cb.is_checked());

        host.dispatch(
            &cb.event_route("click"),
            Method::Get,
            Request::with_query([("checked", "false")]),
        )
        .unwrap();
        assert!(!cb.is_checked());
    }

    #[test]
    fn click_payload_carries_full_snapshot() {
        let (host, transport) = testutil::polling();
        let opts = WidgetOptions::new().with(
            OptionKey::Value,
            crate::options::OptionValue::Text("agree".into()),
        );
        let cb = CheckBox::new("c", "Accept", transport, &opts).unwrap();
        cb.on_click(|_, props| {
            assert_eq!(props.get_str("title"), Some("Accept"));
            assert_eq!(props.get_str("value"), Some("agree"));
            assert_eq!(props.get_bool("checked"), Some(true));
            assert_eq!(props.get_bool("disabled"), Some(false));
            Ok(json!(props.get_str("value")))
        });

        let resp = host
            .dispatch(
                &cb.event_route("click"),
                Method::Get,
                Request::with_query([("checked", "true")]),
            )
            .unwrap();
        assert_eq!(resp.body_json().unwrap(), json!({"result": "agree"}));
        assert_eq!(cb.value(), "agree");
    }

    #[test]
    fn set_checked_syncs() {
        let (host, transport) = testutil::polling();
        let cb = CheckBox::new("c", "Accept", transport, &WidgetOptions::new()).unwrap();
        cb.set_checked(true);
        let props = host
            .dispatch(&cb.props_route(), Method::Get, Request::new())
            .unwrap()
            .body_json()
            .unwrap();
        assert_eq!(props["checked"], json!(true));
        assert!(cb.render().contains("checked"));
    }

    #[test]
    fn disabled_ignores_toggle() {
        let (host, transport) = testutil::polling();
        let opts =
            WidgetOptions::new().with(OptionKey::Disabled, crate::options::OptionValue::Flag(true));
        let cb = CheckBox::new("c", "Accept", transport, &opts).unwrap();
        host.dispatch(
            &cb.event_route("click"),
            Method::Get,
            Request::with_query([("checked", "true")]),
        )
        .unwrap();
        assert!(!cb.is_checked());
    }
}
