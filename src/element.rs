//! The widget base: an HTML element with identity, attributes, and children.
//!
//! [`Element`] is the data model every catalog widget builds on: a tag, a
//! stable id (rendered as both `id=` and `name=`), string properties, inline
//! styles, HTML boolean attributes, CSS classes, inner text, and an ordered
//! child list. The parent link is a back-reference by id — children are owned
//! by the parent's `children` vec, traversal is always downward.
//!
//! Rendering is total: optional sections (style, class, text) are simply
//! omitted when empty. Properties render in sorted key order so output is
//! deterministic; the order carries no meaning.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::WidgetError;

/// Escape single quotes for embedding in a single-quoted HTML attribute.
fn attr_escape(value: &str) -> String {
    value.replace('\'', "&#39;")
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A server-side HTML element: the base data model for all widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    id: String,
    properties: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    boolean_attrs: BTreeSet<String>,
    css_classes: Vec<String>,
    text: Option<String>,
    children: Vec<Element>,
    parent: Option<String>,
}

impl Element {
    /// Create an element with the given tag and id. The id doubles as the
    /// HTML `name` attribute and must be unique within a page render.
    pub fn new(tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
            properties: BTreeMap::new(),
            style: BTreeMap::new(),
            boolean_attrs: BTreeSet::new(),
            css_classes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// The element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The HTML tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The parent element's id, if attached.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    // ── Builders ─────────────────────────────────────────────────────

    /// Set a property (builder).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set a style entry (builder).
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_style(key, value);
        self
    }

    /// Add a boolean attribute (builder).
    pub fn with_boolean_attr(mut self, attr: impl Into<String>) -> Self {
        self.add_boolean_attr(attr);
        self
    }

    /// Add a CSS class (builder).
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.add_css_class(class);
        self
    }

    /// Set the inner text (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Set a property value, replacing any previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Remove a property. No-op if absent.
    pub fn remove_property(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    /// Look up a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    // ── Styles ───────────────────────────────────────────────────────

    /// Add or replace a CSS style entry.
    pub fn add_style(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.style.insert(key.into(), value.into());
    }

    /// Remove a style entry. No-op if absent.
    pub fn remove_style(&mut self, key: &str) -> Option<String> {
        self.style.remove(key)
    }

    /// Look up a style entry.
    pub fn style(&self, key: &str) -> Option<&str> {
        self.style.get(key).map(String::as_str)
    }

    // ── Boolean attributes ───────────────────────────────────────────

    /// Add an HTML boolean attribute (`disabled`, `readonly`, `checked`, ...).
    pub fn add_boolean_attr(&mut self, attr: impl Into<String>) {
        self.boolean_attrs.insert(attr.into());
    }

    /// Remove a boolean attribute. No-op if absent.
    pub fn remove_boolean_attr(&mut self, attr: &str) -> bool {
        self.boolean_attrs.remove(attr)
    }

    /// Whether a boolean attribute is set.
    pub fn has_boolean_attr(&self, attr: &str) -> bool {
        self.boolean_attrs.contains(attr)
    }

    /// Set or clear a boolean attribute from a flag.
    pub fn set_boolean_attr(&mut self, attr: &str, on: bool) {
        if on {
            self.add_boolean_attr(attr);
        } else {
            self.remove_boolean_attr(attr);
        }
    }

    // ── CSS classes ──────────────────────────────────────────────────

    /// Add a CSS class. Duplicate adds are ignored; order is preserved.
    pub fn add_css_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.css_classes.iter().any(|c| *c == class) {
            self.css_classes.push(class);
        }
    }

    /// Remove a CSS class. No-op if absent.
    pub fn remove_css_class(&mut self, class: &str) {
        self.css_classes.retain(|c| c != class);
    }

    /// Whether a CSS class is present.
    pub fn has_css_class(&self, class: &str) -> bool {
        self.css_classes.iter().any(|c| c == class)
    }

    // ── Text ─────────────────────────────────────────────────────────

    /// Set the inner text, rendered before any children.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Clear the inner text.
    pub fn clear_text(&mut self) {
        self.text = None;
    }

    /// The inner text, if set.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    // ── Children ─────────────────────────────────────────────────────

    /// Append a child element, recording the back-reference to this element.
    ///
    /// Fails with [`WidgetError::InvalidParent`] if the child is already
    /// attached somewhere, and [`WidgetError::DuplicateChild`] if a sibling
    /// with the same id exists.
    pub fn add_child(&mut self, mut child: Element) -> Result<(), WidgetError> {
        if let Some(parent) = &child.parent {
            return Err(WidgetError::InvalidParent(
                child.id.clone(),
                parent.clone(),
            ));
        }
        if self.children.iter().any(|c| c.id == child.id) {
            return Err(WidgetError::DuplicateChild(
                child.id.clone(),
                self.id.clone(),
            ));
        }
        child.parent = Some(self.id.clone());
        self.children.push(child);
        Ok(())
    }

    /// Detach and return the child with the given id.
    ///
    /// Fails with [`WidgetError::NotAChild`] if no such child exists. The
    /// returned element's parent back-reference is cleared.
    pub fn remove_child(&mut self, child_id: &str) -> Result<Element, WidgetError> {
        let index = self
            .children
            .iter()
            .position(|c| c.id == child_id)
            .ok_or_else(|| WidgetError::NotAChild(child_id.to_owned(), self.id.clone()))?;
        let mut child = self.children.remove(index);
        child.parent = None;
        Ok(child)
    }

    /// Remove all children.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// The children in render order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Mutable access to the child with the given id.
    pub fn child_mut(&mut self, child_id: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.id == child_id)
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Render the opening tag: id, name, properties, style, class, boolean
    /// attributes.
    pub fn open_tag(&self) -> String {
        let mut out = format!(
            "<{} id='{}' name='{}'",
            self.tag,
            attr_escape(&self.id),
            attr_escape(&self.id)
        );
        for (key, value) in &self.properties {
            out.push_str(&format!(" {}='{}'", key, attr_escape(value)));
        }
        if !self.style.is_empty() {
            out.push_str(" style='");
            for (key, value) in &self.style {
                out.push_str(&format!("{}:{};", key, attr_escape(value)));
            }
            out.push('\'');
        }
        if !self.css_classes.is_empty() {
            out.push_str(&format!(
                " class='{}'",
                attr_escape(&self.css_classes.join(" "))
            ));
        }
        for attr in &self.boolean_attrs {
            out.push(' ');
            out.push_str(attr);
        }
        out.push('>');
        out
    }

    /// Render the closing tag.
    pub fn close_tag(&self) -> String {
        format!("</{}>", self.tag)
    }

    /// Render the element and its subtree: opening tag, inner text, children
    /// in order, closing tag. Childless void elements self-close. Rendering
    /// never fails.
    pub fn render(&self) -> String {
        if VOID_TAGS.contains(&self.tag.as_str()) && self.text.is_none() && self.children.is_empty()
        {
            let mut out = self.open_tag();
            out.pop();
            out.push_str(" />");
            return out;
        }
        let mut out = self.open_tag();
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            out.push_str(&child.render());
        }
        out.push_str(&self.close_tag());
        out
    }
}

/// Tags with no content model; they render as `<tag ... />`.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_defaults() {
        let el = Element::new("div", "box");
        assert_eq!(el.tag(), "div");
        assert_eq!(el.id(), "box");
        assert!(el.parent().is_none());
        assert!(el.children().is_empty());
        assert!(el.text().is_none());
    }

    #[test]
    fn render_minimal() {
        let el = Element::new("div", "box");
        assert_eq!(el.render(), "<div id='box' name='box'></div>");
    }

    #[test]
    fn render_properties_sorted() {
        let el = Element::new("input", "b")
            .with_property("value", "Push")
            .with_property("type", "button");
        assert_eq!(
            el.render(),
            "<input id='b' name='b' type='button' value='Push' />"
        );
    }

    #[test]
    fn render_style_and_class() {
        let el = Element::new("div", "x")
            .with_style("width", "100%")
            .with_style("color", "red")
            .with_css_class("a")
            .with_css_class("b");
        assert_eq!(
            el.render(),
            "<div id='x' name='x' style='color:red;width:100%;' class='a b'></div>"
        );
    }

    #[test]
    fn render_boolean_attrs_bare() {
        let el = Element::new("input", "c")
            .with_boolean_attr("disabled")
            .with_boolean_attr("checked");
        assert_eq!(
            el.render(),
            "<input id='c' name='c' checked disabled />"
        );
    }

    #[test]
    fn void_tags_self_close() {
        assert_eq!(Element::new("br", "b").render(), "<br id='b' name='b' />");
        assert_eq!(Element::new("div", "d").render(), "<div id='d' name='d'></div>");
        // A void tag carrying text loses the shorthand.
        let labeled = Element::new("input", "i").with_text("x");
        assert_eq!(labeled.render(), "<input id='i' name='i'>x</input>");
    }

    #[test]
    fn render_escapes_single_quotes() {
        let el = Element::new("input", "q").with_property("value", "it's");
        assert_eq!(
            el.render(),
            "<input id='q' name='q' value='it&#39;s' />"
        );
    }

    #[test]
    fn render_text_before_children() {
        let mut el = Element::new("button", "b").with_text("Go");
        el.add_child(Element::new("span", "icon")).unwrap();
        assert_eq!(
            el.render(),
            "<button id='b' name='b'>Go<span id='icon' name='icon'></span></button>"
        );
    }

    #[test]
    fn children_render_in_insertion_order() {
        let mut el = Element::new("div", "root");
        el.add_child(Element::new("p", "first")).unwrap();
        el.add_child(Element::new("p", "second")).unwrap();
        el.add_child(Element::new("p", "third")).unwrap();
        let html = el.render();
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        let third = html.find("third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn add_child_sets_parent() {
        let mut el = Element::new("div", "root");
        el.add_child(Element::new("p", "kid")).unwrap();
        assert_eq!(el.children()[0].parent(), Some("root"));
    }

    #[test]
    fn add_child_rejects_attached_child() {
        let mut a = Element::new("div", "a");
        let mut b = Element::new("div", "b");
        b.add_child(Element::new("p", "kid")).unwrap();
        let kid = b.remove_child("kid").unwrap();
        // A detached child can move to a new parent.
        a.add_child(kid).unwrap();

        // But a child already attached cannot be added again.
        let attached = a.children()[0].clone();
        let err = a.add_child(attached).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidParent(..)));
    }

    #[test]
    fn add_child_rejects_duplicate_id() {
        let mut el = Element::new("div", "root");
        el.add_child(Element::new("p", "kid")).unwrap();
        let err = el.add_child(Element::new("span", "kid")).unwrap_err();
        assert!(matches!(err, WidgetError::DuplicateChild(..)));
    }

    #[test]
    fn remove_child_clears_parent() {
        let mut el = Element::new("div", "root");
        el.add_child(Element::new("p", "kid")).unwrap();
        let kid = el.remove_child("kid").unwrap();
        assert!(kid.parent().is_none());
        assert!(el.children().is_empty());
    }

    #[test]
    fn remove_child_missing() {
        let mut el = Element::new("div", "root");
        let err = el.remove_child("ghost").unwrap_err();
        assert!(matches!(err, WidgetError::NotAChild(..)));
    }

    #[test]
    fn property_updates() {
        let mut el = Element::new("input", "t");
        el.set_property("type", "text");
        assert_eq!(el.property("type"), Some("text"));
        el.set_property("type", "password");
        assert_eq!(el.property("type"), Some("password"));
        assert_eq!(el.remove_property("type"), Some("password".to_owned()));
        assert_eq!(el.property("type"), None);
    }

    #[test]
    fn style_updates() {
        let mut el = Element::new("div", "s");
        el.add_style("color", "red");
        assert_eq!(el.style("color"), Some("red"));
        el.remove_style("color");
        assert_eq!(el.style("color"), None);
    }

    #[test]
    fn boolean_attr_toggle() {
        let mut el = Element::new("input", "d");
        el.set_boolean_attr("disabled", true);
        assert!(el.has_boolean_attr("disabled"));
        el.set_boolean_attr("disabled", false);
        assert!(!el.has_boolean_attr("disabled"));
    }

    #[test]
    fn css_class_dedup() {
        let mut el = Element::new("div", "c");
        el.add_css_class("primary");
        el.add_css_class("primary");
        el.add_css_class("large");
        assert!(el.has_css_class("primary"));
        assert_eq!(
            el.render(),
            "<div id='c' name='c' class='primary large'></div>"
        );
        el.remove_css_class("primary");
        assert!(!el.has_css_class("primary"));
    }

    #[test]
    fn child_mut_access() {
        let mut el = Element::new("div", "root");
        el.add_child(Element::new("p", "kid")).unwrap();
        el.child_mut("kid").unwrap().set_text("hello");
        assert_eq!(el.children()[0].text(), Some("hello"));
        assert!(el.child_mut("ghost").is_none());
    }
}
