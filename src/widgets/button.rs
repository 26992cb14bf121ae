//! Button widget: a clickable input button.
//!
//! Renders as `<input type='button'>` with the title as its value. The
//! `click` event carries the title and disabled flag back to the server; a
//! disabled button ignores inbound property deltas.

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
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct ButtonState {
    element: Element,
    title: String,
    disabled: bool,
}

impl WidgetState for ButtonState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".into(), json!(self.title));
        map.insert("disabled".into(), json!(self.disabled));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        if let Some(title) = props.get_str("title") {
            self.title = title.to_owned();
            self.element.set_property("value", title);
        }
    }

    fn adapter(&self) -> AdapterSpec {
        let capture = vec![
            FieldBinding::value("title"),
            FieldBinding::prop("disabled", "disabled"),
        ];
        AdapterSpec {
            fields: capture.clone(),
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture,
            }],
            ..AdapterSpec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A clickable button.
///
/// # Examples
///
/// ```ignore
/// let btn = Button::new("b1", "Push", transport, &WidgetOptions::new())?;
/// btn.on_click(|source, _props| Ok(json!(source)));
/// ```
#[derive(Clone, Debug)]
pub struct Button {
    core: Core<ButtonState>,
}

impl Button {
    /// Create a button and register its endpoints.
    pub fn new(
        id: &str,
        title: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);

        let mut element = Element::new("input", id)
            .with_property("type", "button")
            .with_property("value", title);
        if disabled {
            element.add_boolean_attr("disabled");
        }
        options.apply_common(&mut element);

        let state = ButtonState {
            element,
            title: title.to_owned(),
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

    /// The current title.
    pub fn title(&self) -> String {
        self.core.read(|s| s.title.clone())
    }

    /// Set the title and publish the change.
    pub fn set_title(&self, title: &str) {
        self.core.update(|s| {
            s.title = title.to_owned();
            s.element.set_property("value", title);
        });
    }

    /// Whether the button is disabled.
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

impl WidgetHandle for Button {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Button {
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
    use crate::route::{Method, Request, RouteHost};
    use crate::widgets::testutil;

    #[test]
    fn renders_input_button() {
        let (_, transport) = testutil::polling();
        let btn = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        let html = btn.render();
        assert!(html.contains("<input id='b' name='b' type='button' value='Push' />"));
        assert!(html.contains("<script>"));
    }

    #[test]
    fn registers_props_and_click_routes() {
        let (host, transport) = testutil::polling();
        let btn = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        assert!(host
            .iter_routes()
            .iter()
            .any(|k| k.as_str() == btn.props_route().as_str()));
        assert!(host
            .iter_routes()
            .iter()
            .any(|k| k.as_str().ends_with("_b_click")));
    }

    #[test]
    fn click_fires_callback_with_snapshot() {
        let (host, transport) = testutil::polling();
        let btn = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        btn.on_click(|source, props| {
            assert_eq!(source, "b");
            assert_eq!(props.get_str("title"), Some("Push"));
            assert_eq!(props.get_bool("disabled"), Some(false));
            Ok(json!("clicked"))
        });
        let resp = host
            .dispatch(
                &btn.event_route("click"),
                Method::Get,
                Request::with_query([("title", "Push"), ("disabled", "false")]),
            )
            .unwrap();
        assert_eq!(resp.body_json().unwrap(), json!({"result": "clicked"}));
    }

    #[test]
    fn set_title_is_visible_on_next_sync() {
        let (host, transport) = testutil::polling();
        let btn = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        btn.set_title("Stop");
        let resp = host
            .dispatch(&btn.props_route(), Method::Get, Request::new())
            .unwrap();
        assert_eq!(
            resp.body_json().unwrap(),
            json!({"title": "Stop", "disabled": false})
        );
        assert!(btn.render().contains("value='Stop'"));
    }

    #[test]
    fn disabled_button_ignores_inbound_title() {
        let (host, transport) = testutil::polling();
        let btn = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        btn.set_disabled(true);
        host.dispatch(
            &btn.event_route("click"),
            Method::Get,
            Request::with_query([("title", "Hacked")]),
        )
        .unwrap();
        assert_eq!(btn.title(), "Push");
    }

    #[test]
    fn duplicate_construction_is_idempotent() {
        let (host, transport) = testutil::polling();
        let _a = Button::new("b", "Push", transport.clone(), &WidgetOptions::new()).unwrap();
        let _b = Button::new("b", "Push", transport, &WidgetOptions::new()).unwrap();
        assert_eq!(host.len(), 2); // props + click, registered once
    }

    #[test]
    fn unsupported_option_rejected() {
        let (_, transport) = testutil::polling();
        let opts = WidgetOptions::new().with(OptionKey::Checked, crate::options::OptionValue::Flag(true));
        let err = Button::new("b", "Push", transport, &opts).unwrap_err();
        assert!(matches!(err, WidgetError::Validation(_)));
    }

    #[test]
    fn disabled_option_renders_attribute() {
        let (_, transport) = testutil::polling();
        let opts =
            WidgetOptions::new().with(OptionKey::Disabled, crate::options::OptionValue::Flag(true));
        let btn = Button::new("b", "Push", transport, &opts).unwrap();
        assert!(btn.is_disabled());
        assert!(btn.render().contains(" disabled>"));
    }
}
