//! Flow layout: children render inline, wrapping with the page.

use crate::widget::{Include, Render};

/// An inline flowing container.
pub struct FlowLayout {
    id: String,
    children: Vec<Box<dyn Render>>,
}

impl FlowLayout {
    /// Create an empty flow layout.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            children: Vec::new(),
        }
    }

    /// Append a child.
    pub fn add(&mut self, child: impl Render + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the layout has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Render for FlowLayout {
    fn render(&self) -> String {
        let mut out = format!(
            "<div id='{id}' name='{id}' style='display:flex;flex-wrap:wrap;'>",
            id = self.id
        );
        for child in &self.children {
            out.push_str("<span style='margin:2px;'>");
            out.push_str(&child.render());
            out.push_str("</span>");
        }
        out.push_str("</div>");
        out
    }

    fn includes(&self) -> Vec<Include> {
        let mut manifest: Vec<Include> = Vec::new();
        for child in &self.children {
            for include in child.includes() {
                if !manifest.contains(&include) {
                    manifest.push(include);
                }
            }
        }
        manifest
    }
}

// ===========================================================================
// Tests
// ===========================================================================
