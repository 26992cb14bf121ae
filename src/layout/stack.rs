//! Stacking layouts: vertical and horizontal single-axis containers.

use crate::widget::{Include, Render};

fn collect_includes(children: &[Box<dyn Render>]) -> Vec<Include> {
    let mut manifest: Vec<Include> = Vec::new();
    for child in children {
        for include in child.includes() {
            if !manifest.contains(&include) {
                manifest.push(include);
            }
        }
    }
    manifest
}

/// A top-to-bottom stack.
pub struct VerticalLayout {
    id: String,
    children: Vec<Box<dyn Render>>,
}

impl VerticalLayout {
    /// Create an empty vertical stack.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            children: Vec::new(),
        }
    }

    /// Append a child below the current ones.
    pub fn add(&mut self, child: impl Render + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Render for VerticalLayout {
    fn render(&self) -> String {
        let mut out = format!("<div id='{id}' name='{id}'>", id = self.id);
        for child in &self.children {
            out.push_str("<div>");
            out.push_str(&child.render());
            out.push_str("</div>");
        }
        out.push_str("</div>");
        out
    }

    fn includes(&self) -> Vec<Include> {
        collect_includes(&self.children)
    }
}

/// A left-to-right stack.
pub struct HorizontalLayout {
    id: String,
    children: Vec<Box<dyn Render>>,
}

impl HorizontalLayout {
    /// Create an empty horizontal stack.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            children: Vec::new(),
        }
    }

    /// Append a child to the right of the current ones.
    pub fn add(&mut self, child: impl Render + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Render for HorizontalLayout {
    fn render(&self) -> String {
        let mut out = format!(
            "<div id='{id}' name='{id}' style='display:flex;'>",
            id = self.id
        );
        for child in &self.children {
            out.push_str("<div style='flex:1;'>");
            out.push_str(&child.render());
            out.push_str("</div>");
        }
        out.push_str("</div>");
        out
    }

    fn includes(&self) -> Vec<Include> {
        collect_includes(&self.children)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
