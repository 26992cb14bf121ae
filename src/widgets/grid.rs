//! Grid widget: a tabular data grid driven by commands.
//!
//! The grid's DOM is managed by a client-side grid component; the server owns
//! the record list and steers the client with commands (`ADD-RECORD`,
//! `HIDE-COLUMN`, `SELECT-ALL`, ...). Record ids are assigned server-side as
//! `record count + 1` at insert, so they are stable for the grid's lifetime.
//! Grids poll on the heavy period.

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
    OptionKey::Header,
    OptionKey::Footer,
    OptionKey::Toolbar,
    OptionKey::Sortable,
    OptionKey::Filterable,
    OptionKey::SelectColumn,
    OptionKey::MultiSelect,
    OptionKey::LineNumbers,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

/// Stylesheet and script for the client grid component.
pub const GRID_CSS_URL: &str = "/static/w2ui.min.css";
pub const GRID_JS_URL: &str = "/static/w2ui.min.js";

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A grid column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Record field this column reads.
    pub field: String,
    /// Header caption.
    pub caption: String,
    /// Column width, e.g. `"30%"` or `"120px"`.
    pub size: String,
}

impl Column {
    /// Define a column.
    pub fn new(
        field: impl Into<String>,
        caption: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            caption: caption.into(),
            size: size.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "field": self.field,
            "caption": self.caption,
            "size": self.size,
        })
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct GridState {
    element: Element,
    columns: Vec<Column>,
    records: Vec<Map<String, Value>>,
    selected: Vec<u64>,
    multi_select: bool,
}

impl WidgetState for GridState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("total".into(), json!(self.records.len()));
        map.insert("selected".into(), json!(self.selected));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        let recid = props
            .get("recid")
            .and_then(|v| v.as_number().or_else(|| v.as_str()?.parse().ok()))
            .map(|n| n as u64);
        if let Some(recid) = recid {
            if self.records.iter().any(|r| r["recid"] == json!(recid)) {
                if self.multi_select {
                    if !self.selected.contains(&recid) {
                        self.selected.push(recid);
                    }
                } else {
                    self.selected = vec![recid];
                }
            }
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            poll_period_ms: POLL_PERIOD_HEAVY_MS,
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture: vec![FieldBinding::value("recid")],
            }],
            command_js: Some(
                "                    applyGridCommand(el.id, props);".to_owned(),
            ),
            ..AdapterSpec::new()
        }
    }

    fn dependencies(&self) -> Vec<Include> {
        vec![Include::css(GRID_CSS_URL), Include::js(GRID_JS_URL)]
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A command-driven data grid.
#[derive(Clone)]
pub struct Grid {
    core: Core<GridState>,
}

impl Grid {
    /// Create a grid with the given columns and register its endpoints.
    pub fn new(
        id: &str,
        columns: Vec<Column>,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        if columns.is_empty() {
            return Err(WidgetError::Validation(
                "grid needs at least one column".to_owned(),
            ));
        }

        let mut element = Element::new("div", id).with_css_class("webloom-grid");
        element.set_property(
            "data-columns",
            Value::Array(columns.iter().map(Column::to_json).collect()).to_string(),
        );
        options.apply_common(&mut element);

        let state = GridState {
            element,
            columns,
            records: Vec::new(),
            selected: Vec::new(),
            multi_select: options.flag(OptionKey::MultiSelect).unwrap_or(false),
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

    /// The column definitions.
    pub fn columns(&self) -> Vec<Column> {
        self.core.read(|s| s.columns.clone())
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.core.read(|s| s.records.len())
    }

    /// Append a record. The assigned `recid` (record count + 1) is written
    /// into the record and returned; an `ADD-RECORD` command carries the
    /// record to the client.
    pub fn add_record(&self, record: Map<String, Value>) -> u64 {
        let stamped = self.core.update(|s| {
            let recid = s.records.len() as u64 + 1;
            let mut record = record;
            record.insert("recid".into(), json!(recid));
            s.records.push(record.clone());
            record
        });
        let recid = stamped["recid"].as_u64().unwrap_or(0);
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("ADD-RECORD").arg(Value::Object(stamped)),
        );
        recid
    }

    /// The records, with their assigned `recid`s.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.core.read(|s| s.records.clone())
    }

    /// Selected record ids.
    pub fn selected(&self) -> Vec<u64> {
        self.core.read(|s| s.selected.clone())
    }

    /// Select a record server-side and notify the client.
    pub fn select_record(&self, recid: u64) -> Result<(), WidgetError> {
        self.core.update(|s| {
            if !s.records.iter().any(|r| r["recid"] == json!(recid)) {
                return Err(WidgetError::Validation(format!(
                    "no record with recid {recid}"
                )));
            }
            if s.multi_select {
                if !s.selected.contains(&recid) {
                    s.selected.push(recid);
                }
            } else {
                s.selected = vec![recid];
            }
            Ok(())
        })?;
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("SELECT-RECORD").arg(recid),
        );
        Ok(())
    }

    /// Select every record.
    pub fn select_all(&self) {
        self.core.update(|s| {
            s.selected = s
                .records
                .iter()
                .filter_map(|r| r["recid"].as_u64())
                .collect();
        });
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("SELECT-ALL"));
    }

    /// Clear the selection.
    pub fn unselect_all(&self) {
        self.core.update(|s| s.selected.clear());
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("UNSELECT-ALL"));
    }

    /// Hide a column on the client.
    pub fn hide_column(&self, field: &str) -> Result<(), WidgetError> {
        self.ensure_column(field)?;
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("HIDE-COLUMN").arg(field),
        );
        Ok(())
    }

    /// Show a previously hidden column.
    pub fn show_column(&self, field: &str) -> Result<(), WidgetError> {
        self.ensure_column(field)?;
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("SHOW-COLUMN").arg(field),
        );
        Ok(())
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.core.update(|s| {
            s.records.clear();
            s.selected.clear();
        });
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new("CLEAR"));
    }

    fn ensure_column(&self, field: &str) -> Result<(), WidgetError> {
        self.core.read(|s| {
            if s.columns.iter().any(|c| c.field == field) {
                Ok(())
            } else {
                Err(WidgetError::Validation(format!(
                    "grid has no column `{field}`"
                )))
            }
        })
    }

    /// Register the row click callback.
    pub fn on_click<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("click", Arc::new(callback));
    }
}

impl WidgetHandle for Grid {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Grid {
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
