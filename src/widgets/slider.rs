//! Slider widget: an `<input type='range'>` bound to a numeric value.
//!
//! The value is clamped to `[min, max]` on both server-side sets and inbound
//! events; out-of-range construction options fail validation.

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
    OptionKey::Min,
    OptionKey::Max,
    OptionKey::Step,
    OptionKey::StartValue,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct SliderState {
    element: Element,
    value: f64,
    min: f64,
    max: f64,
    disabled: bool,
}

impl SliderState {
    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn write_value(&mut self, value: f64) {
        self.value = self.clamp(value);
        let value = self.value;
        self.element.set_property("value", format_number(value));
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl WidgetState for SliderState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("value".into(), json!(self.value));
        map.insert("disabled".into(), json!(self.disabled));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        // Range inputs report their value as text on the query string.
        let value = props
            .get("value")
            .and_then(|v| v.as_number().or_else(|| v.as_str()?.parse().ok()));
        if let Some(value) = value {
            self.write_value(value);
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            fields: vec![
                FieldBinding::value("value"),
                FieldBinding::prop("disabled", "disabled"),
            ],
            events: vec![EventWiring {
                dom_event: "change",
                event: "change",
                capture: vec![FieldBinding::value("value")],
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A numeric range slider.
#[derive(Clone)]
pub struct Slider {
    core: Core<SliderState>,
}

impl Slider {
    /// Create a slider and register its endpoints. Defaults: min 0, max 100,
    /// start at min.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let min = options.number(OptionKey::Min).unwrap_or(0.0);
        let max = options.number(OptionKey::Max).unwrap_or(100.0);
        if min >= max {
            return Err(WidgetError::Validation(format!(
                "slider min ({min}) must be below max ({max})"
            )));
        }
        let start = options.number(OptionKey::StartValue).unwrap_or(min);
        if !(min..=max).contains(&start) {
            return Err(WidgetError::Validation(format!(
                "slider start value ({start}) outside [{min}, {max}]"
            )));
        }
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);

        let mut element = Element::new("input", id)
            .with_property("type", "range")
            .with_property("min", format_number(min))
            .with_property("max", format_number(max))
            .with_property("value", format_number(start));
        if let Some(step) = options.number(OptionKey::Step) {
            element.set_property("step", format_number(step));
        }
        if disabled {
            element.add_boolean_attr("disabled");
        }
        options.apply_common(&mut element);

        let state = SliderState {
            element,
            value: start,
            min,
            max,
            disabled,
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

    /// The current value.
    pub fn value(&self) -> f64 {
        self.core.read(|s| s.value)
    }

    /// Set the value (clamped to the range) and publish the change.
    pub fn set_value(&self, value: f64) {
        self.core.update(|s| s.write_value(value));
    }

    /// The `(min, max)` bounds.
    pub fn range(&self) -> (f64, f64) {
        self.core.read(|s| (s.min, s.max))
    }

    /// Register the change callback.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("change", Arc::new(callback));
    }
}

impl WidgetHandle for Slider {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Slider {
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
    use crate::options::OptionValue;
    use crate::route::{Method, Request};
    use crate::widgets::testutil;

    #[test]
    fn renders_range_input() {
        let (_, transport) = testutil::polling();
        let opts = WidgetOptions::new()
            .with(OptionKey::Min, OptionValue::Number(10.0))
            .with(OptionKey::Max, OptionValue::Number(20.0))
            .with(OptionKey::Step, OptionValue::Number(0.5));
        let sl = Slider::new("s", transport, &opts).unwrap();
        let html = sl.render();
        assert!(html.contains("type='range'"));
        assert!(html.contains("min='10'"));
        assert!(html.contains("max='20'"));
        assert!(html.contains("step='0.5'"));
        assert_eq!(sl.value(), 10.0);
    }

    #[test]
    fn invalid_ranges_rejected() {
        let (_, transport) = testutil::polling();
        let opts = WidgetOptions::new()
            .with(OptionKey::Min, OptionValue::Number(5.0))
            .with(OptionKey::Max, OptionValue::Number(5.0));
        assert!(Slider::new("s", transport.clone(), &opts).is_err());

        let opts = WidgetOptions::new().with(OptionKey::StartValue, OptionValue::Number(500.0));
        assert!(Slider::new("s", transport, &opts).is_err());
    }

    #[test]
    fn change_event_parses_text_value() {
        let (host, transport) = testutil::polling();
        let sl = Slider::new("s", transport, &WidgetOptions::new()).unwrap();
        sl.on_change(|_, _| Ok(Value::Null));
        host.dispatch(
            &sl.event_route("change"),
            Method::Get,
            Request::with_query([("value", "42")]),
        )
        .unwrap();
        assert_eq!(sl.value(), 42.0);
    }

    #[test]
    fn set_value_clamps() {
        let (_, transport) = testutil::polling();
        let sl = Slider::new("s", transport, &WidgetOptions::new()).unwrap();
        sl.set_value(150.0);
        assert_eq!(sl.value(), 100.0);
        sl.set_value(-3.0);
        assert_eq!(sl.value(), 0.0);
    }

    #[test]
    fn inbound_value_clamps_too() {
        let (host, transport) = testutil::polling();
        let sl = Slider::new("s", transport, &WidgetOptions::new()).unwrap();
        host.dispatch(
            &sl.event_route("change"),
            Method::Get,
            Request::with_query([("value", "9999")]),
        )
        .unwrap();
        assert_eq!(sl.value(), 100.0);
    }
}
