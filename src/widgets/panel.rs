//! Panel widget: a plain container `<div>`.
//!
//! Panels host other elements and can be shown or hidden server-side. They
//! register no events; only the sync endpoint exists.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::WidgetError;
use crate::options::{OptionKey, WidgetOptions};
use crate::transport::script::{AdapterSpec, DomTarget, FieldBinding};
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
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

struct PanelState {
    element: Element,
    visible: bool,
}

impl WidgetState for PanelState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("visible".into(), json!(self.visible));
        map
    }

    fn apply_event(&mut self, _props: &mut EventProps) {}

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            fields: vec![FieldBinding {
                key: "visible",
                target: DomTarget::Prop("hidden"),
            }],
            ..AdapterSpec::new()
        }
    }
}

/// A container panel.
#[derive(Clone)]
pub struct Panel {
    core: Core<PanelState>,
}

impl Panel {
    /// Create a panel and register its sync endpoint.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let mut element = Element::new("div", id);
        options.apply_common(&mut element);
        let visible = !options.flag(OptionKey::Hidden).unwrap_or(false);

        let state = PanelState { element, visible };
        let core = Core::attach(module_path!(), id, state, Vec::new(), transport);
        Ok(Self { core })
    }

    /// Add a child element.
    pub fn add_child(&self, child: Element) -> Result<(), WidgetError> {
        self.core.update(|s| s.element.add_child(child))
    }

    /// Detach a child element by id.
    pub fn remove_child(&self, child_id: &str) -> Result<Element, WidgetError> {
        self.core.update(|s| s.element.remove_child(child_id))
    }

    /// Whether the panel is visible.
    pub fn is_visible(&self) -> bool {
        self.core.read(|s| s.visible)
    }

    /// Show or hide the panel and publish the change.
    pub fn set_visible(&self, visible: bool) {
        self.core.update(|s| {
            s.visible = visible;
            if visible {
                s.element.remove_style("display");
            } else {
                s.element.add_style("display", "none");
            }
        });
    }
}

impl WidgetHandle for Panel {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Panel {
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
