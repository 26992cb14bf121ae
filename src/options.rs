//! Construction options recognized across the widget catalog.
//!
//! Widgets accept a [`WidgetOptions`] bag at construction. The recognized key
//! set is the union across the catalog; unknown keys are rejected with
//! [`WidgetError::UnknownOption`] when the bag is built, and each widget
//! additionally rejects recognized keys it does not support.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::WidgetError;

// ---------------------------------------------------------------------------
// OptionKey
// ---------------------------------------------------------------------------

/// A recognized construction option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionKey {
    Description,
    PropertiesMap,
    StyleMap,
    AttributesList,
    CssClassesList,
    Disabled,
    Readonly,
    Required,
    Multiple,
    Min,
    Max,
    Value,
    Text,
    Title,
    Checked,
    Icon,
    Size,
    OptionsMap,
    UploadFolder,
    AllowedExtensions,
    Orientation,
    Step,
    NumberFormat,
    Collapsible,
    Sortable,
    Filterable,
    SelectColumn,
    MultiSelect,
    LineNumbers,
    Toolbar,
    Footer,
    Header,
    StartValue,
    Hidden,
    ToolTip,
}

impl OptionKey {
    /// The canonical kebab-case name for this key.
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Description => "description",
            OptionKey::PropertiesMap => "properties-map",
            OptionKey::StyleMap => "style-map",
            OptionKey::AttributesList => "attributes-list",
            OptionKey::CssClassesList => "css-classes-list",
            OptionKey::Disabled => "disabled",
            OptionKey::Readonly => "readonly",
            OptionKey::Required => "required",
            OptionKey::Multiple => "multiple",
            OptionKey::Min => "min",
            OptionKey::Max => "max",
            OptionKey::Value => "value",
            OptionKey::Text => "text",
            OptionKey::Title => "title",
            OptionKey::Checked => "checked",
            OptionKey::Icon => "icon",
            OptionKey::Size => "size",
            OptionKey::OptionsMap => "options-map",
            OptionKey::UploadFolder => "upload-folder",
            OptionKey::AllowedExtensions => "allowed-extensions",
            OptionKey::Orientation => "orientation",
            OptionKey::Step => "step",
            OptionKey::NumberFormat => "number-format",
            OptionKey::Collapsible => "collapsible",
            OptionKey::Sortable => "sortable",
            OptionKey::Filterable => "filterable",
            OptionKey::SelectColumn => "select-column",
            OptionKey::MultiSelect => "multi-select",
            OptionKey::LineNumbers => "line-numbers",
            OptionKey::Toolbar => "toolbar",
            OptionKey::Footer => "footer",
            OptionKey::Header => "header",
            OptionKey::StartValue => "start-value",
            OptionKey::Hidden => "hidden",
            OptionKey::ToolTip => "tool-tip",
        }
    }

    /// All recognized keys.
    pub fn all() -> &'static [OptionKey] {
        use OptionKey::*;
        &[
            Description,
            PropertiesMap,
            StyleMap,
            AttributesList,
            CssClassesList,
            Disabled,
            Readonly,
            Required,
            Multiple,
            Min,
            Max,
            Value,
            Text,
            Title,
            Checked,
            Icon,
            Size,
            OptionsMap,
            UploadFolder,
            AllowedExtensions,
            Orientation,
            Step,
            NumberFormat,
            Collapsible,
            Sortable,
            Filterable,
            SelectColumn,
            MultiSelect,
            LineNumbers,
            Toolbar,
            Footer,
            Header,
            StartValue,
            Hidden,
            ToolTip,
        ]
    }
}

impl FromStr for OptionKey {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKey::all()
            .iter()
            .find(|k| k.name() == s)
            .copied()
            .ok_or_else(|| WidgetError::UnknownOption(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// OptionValue
// ---------------------------------------------------------------------------

/// The value attached to an option key.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A boolean flag (`disabled`, `required`, ...).
    Flag(bool),
    /// Free-form text (`description`, `title`, `icon`, ...).
    Text(String),
    /// A numeric value (`min`, `max`, `step`, ...).
    Number(f64),
    /// A key/value map (`properties-map`, `style-map`, `options-map`).
    Map(BTreeMap<String, String>),
    /// An ordered list (`attributes-list`, `css-classes-list`, ...).
    List(Vec<String>),
}

impl OptionValue {
    /// The flag value, if this is a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// The text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The map value, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            OptionValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The list value, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// WidgetOptions
// ---------------------------------------------------------------------------

/// A bag of construction options.
///
/// String keys are resolved against the recognized set when inserted; unknown
/// keys fail immediately, before the widget constructor runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetOptions {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl WidgetOptions {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option by canonical key name.
    pub fn set(&mut self, key: &str, value: OptionValue) -> Result<(), WidgetError> {
        let key = OptionKey::from_str(key)?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Insert an option by typed key (builder).
    pub fn with(mut self, key: OptionKey, value: OptionValue) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Look up an option value.
    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    /// Look up a flag option.
    pub fn flag(&self, key: OptionKey) -> Option<bool> {
        self.values.get(&key).and_then(OptionValue::as_flag)
    }

    /// Look up a text option.
    pub fn text(&self, key: OptionKey) -> Option<&str> {
        self.values.get(&key).and_then(OptionValue::as_text)
    }

    /// Look up a numeric option.
    pub fn number(&self, key: OptionKey) -> Option<f64> {
        self.values.get(&key).and_then(OptionValue::as_number)
    }

    /// Iterate over the present keys.
    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.values.keys().copied()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Verify every present key is in `supported`, failing with
    /// [`WidgetError::Validation`] otherwise. Widgets call this first.
    pub fn check_supported(&self, supported: &[OptionKey]) -> Result<(), WidgetError> {
        for key in self.values.keys() {
            if !supported.contains(key) {
                return Err(WidgetError::Validation(format!(
                    "option `{}` is not supported by this widget",
                    key.name()
                )));
            }
        }
        Ok(())
    }

    /// Apply the element-level options (description, properties-map,
    /// style-map, attributes-list, css-classes-list, tool-tip, hidden) to an
    /// element. Widget-specific options are left to the widget.
    pub fn apply_common(&self, element: &mut crate::element::Element) {
        if let Some(desc) = self.text(OptionKey::Description) {
            element.set_property("title", desc);
        }
        if let Some(tip) = self.text(OptionKey::ToolTip) {
            element.set_property("title", tip);
        }
        if let Some(map) = self.get(OptionKey::PropertiesMap).and_then(OptionValue::as_map) {
            for (k, v) in map {
                element.set_property(k.clone(), v.clone());
            }
        }
        if let Some(map) = self.get(OptionKey::StyleMap).and_then(OptionValue::as_map) {
            for (k, v) in map {
                element.add_style(k.clone(), v.clone());
            }
        }
        if let Some(attrs) = self.get(OptionKey::AttributesList).and_then(OptionValue::as_list) {
            for attr in attrs {
                element.add_boolean_attr(attr.clone());
            }
        }
        if let Some(classes) = self
            .get(OptionKey::CssClassesList)
            .and_then(OptionValue::as_list)
        {
            for class in classes {
                element.add_css_class(class.clone());
            }
        }
        if self.flag(OptionKey::Hidden).unwrap_or(false) {
            element.add_style("display", "none");
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
