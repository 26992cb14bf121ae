//! Toolbar widget: a strip of command buttons, checks, and separators.
//!
//! Item mutations are mirrored to the client with commands (`ADD-ITEM`,
//! `REMOVE-ITEM`, `ENABLE-ITEM`, ...). Clicking an item sends its id back;
//! check items toggle server-side on click.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::{CallbackError, WidgetError};
use crate::event::EventSpec;
use crate::options::{OptionKey, WidgetOptions};
use crate::transport::command::Command;
use crate::transport::script::{AdapterSpec, EventWiring, FieldBinding, POLL_PERIOD_HEAVY_MS};
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

/// What a toolbar item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A plain command button.
    Button,
    /// A toggle that stays pressed.
    Check,
    /// A visual divider; not clickable.
    Separator,
}

/// One toolbar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarItem {
    /// Item id, unique within the toolbar.
    pub id: String,
    /// Behavior.
    pub kind: ItemKind,
    /// Caption (empty for separators).
    pub text: String,
    /// Optional icon CSS class.
    pub icon: Option<String>,
    /// Whether the item is grayed out.
    pub disabled: bool,
    /// Pressed state (check items only).
    pub checked: bool,
}

impl ToolbarItem {
    /// A command button.
    pub fn button(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Button,
            text: text.into(),
            icon: None,
            disabled: false,
            checked: false,
        }
    }

    /// A toggle button.
    pub fn check(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Check,
            ..Self::button(id, text)
        }
    }

    /// A separator.
    pub fn separator(id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Separator,
            ..Self::button(id, "")
        }
    }

    /// Set the icon class (builder).
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "kind": match self.kind {
                ItemKind::Button => "button",
                ItemKind::Check => "check",
                ItemKind::Separator => "separator",
            },
            "text": self.text,
            "icon": self.icon,
            "disabled": self.disabled,
            "checked": self.checked,
        })
    }
}

struct ToolbarState {
    element: Element,
    id: String,
    items: Vec<ToolbarItem>,
    last_clicked: Option<String>,
}

impl ToolbarState {
    fn rebuild(&mut self) {
        self.element.clear_children();
        for item in &self.items {
            let item_id = format!("{}_{}", self.id, item.id);
            let mut child = match item.kind {
                ItemKind::Separator => {
                    Element::new("span", item_id).with_css_class("separator")
                }
                _ => {
                    let mut button = Element::new("button", item_id).with_text(item.text.clone());
                    if item.disabled {
                        button.add_boolean_attr("disabled");
                    }
                    if item.checked {
                        button.add_css_class("checked");
                    }
                    button
                }
            };
            if let Some(icon) = &item.icon {
                child.add_css_class(icon.clone());
            }
            let _ = self.element.add_child(child);
        }
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut ToolbarItem, WidgetError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| WidgetError::Validation(format!("toolbar has no item `{id}`")))
    }
}

impl WidgetState for ToolbarState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("total".into(), json!(self.items.len()));
        map.insert("last_clicked".into(), json!(self.last_clicked));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        let Some(id) = props.get_str("item").map(str::to_owned) else {
            return;
        };
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return;
        };
        if item.disabled || item.kind == ItemKind::Separator {
            return;
        }
        if item.kind == ItemKind::Check {
            item.checked = !item.checked;
        }
        self.last_clicked = Some(id);
        self.rebuild();
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            poll_period_ms: POLL_PERIOD_HEAVY_MS,
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture: vec![FieldBinding::value("item")],
            }],
            command_js: Some("                    applyToolbarCommand(el.id, props);".to_owned()),
            ..AdapterSpec::new()
        }
    }
}

/// A command-driven toolbar.
#[derive(Clone)]
pub struct Toolbar {
    core: Core<ToolbarState>,
}

impl Toolbar {
    /// Create an empty toolbar and register its endpoints.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;

        let mut state = ToolbarState {
            element: Element::new("div", id).with_css_class("webloom-toolbar"),
            id: id.to_owned(),
            items: Vec::new(),
            last_clicked: None,
        };
        state.rebuild();
        options.apply_common(&mut state.element);

        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::get("click")],
            transport,
        );
        Ok(Self { core })
    }

    /// Append an item and notify the client. Duplicate ids are rejected.
    pub fn add_item(&self, item: ToolbarItem) -> Result<(), WidgetError> {
        let payload = item.to_json();
        self.core.update(|s| {
            if s.items.iter().any(|i| i.id == item.id) {
                return Err(WidgetError::Validation(format!(
                    "toolbar item `{}` already exists",
                    item.id
                )));
            }
            s.items.push(item);
            s.rebuild();
            Ok(())
        })?;
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("ADD-ITEM").arg(payload));
        Ok(())
    }

    /// Remove an item by id and notify the client.
    pub fn remove_item(&self, id: &str) -> Result<(), WidgetError> {
        self.core.update(|s| {
            let before = s.items.len();
            s.items.retain(|i| i.id != id);
            if s.items.len() == before {
                return Err(WidgetError::Validation(format!(
                    "toolbar has no item `{id}`"
                )));
            }
            s.rebuild();
            Ok(())
        })?;
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("REMOVE-ITEM").arg(id));
        Ok(())
    }

    /// Enable or disable an item and notify the client.
    pub fn set_item_enabled(&self, id: &str, enabled: bool) -> Result<(), WidgetError> {
        self.core.update(|s| {
            s.item_mut(id)?.disabled = !enabled;
            s.rebuild();
            Ok::<_, WidgetError>(())
        })?;
        let cmd = if enabled { "ENABLE-ITEM" } else { "DISABLE-ITEM" };
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new(cmd).arg(id));
        Ok(())
    }

    /// Check or uncheck a check item and notify the client.
    pub fn set_item_checked(&self, id: &str, checked: bool) -> Result<(), WidgetError> {
        self.core.update(|s| {
            let item = s.item_mut(id)?;
            if item.kind != ItemKind::Check {
                return Err(WidgetError::Validation(format!(
                    "toolbar item `{id}` is not a check item"
                )));
            }
            item.checked = checked;
            s.rebuild();
            Ok(())
        })?;
        let cmd = if checked { "CHECK-ITEM" } else { "UNCHECK-ITEM" };
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new(cmd).arg(id));
        Ok(())
    }

    /// The items in order.
    pub fn items(&self) -> Vec<ToolbarItem> {
        self.core.read(|s| s.items.clone())
    }

    /// Id of the most recently clicked item.
    pub fn last_clicked(&self) -> Option<String> {
        self.core.read(|s| s.last_clicked.clone())
    }

    /// Register the item click callback.
    pub fn on_click<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("click", Arc::new(callback));
    }
}

impl WidgetHandle for Toolbar {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Toolbar {
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
