//! Page composition.
//!
//! A [`Page`] gathers renderable widgets and layouts, collects their include
//! manifests, and renders a complete HTML document. Includes are deduplicated
//! in first-seen order so a catalog widget used twenty times still loads its
//! stylesheet once.

use crate::widget::{Include, Render};

/// A complete HTML page hosting widgets.
pub struct Page {
    title: String,
    children: Vec<Box<dyn Render>>,
    extra_includes: Vec<Include>,
    scripts: Vec<String>,
}

impl Page {
    /// Create an empty page.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
            extra_includes: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// The page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a renderable child.
    pub fn add(&mut self, child: impl Render + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Add a page-level script include.
    pub fn add_js(&mut self, url: impl Into<String>) -> &mut Self {
        self.extra_includes.push(Include::js(url));
        self
    }

    /// Add a page-level stylesheet include.
    pub fn add_css(&mut self, url: impl Into<String>) -> &mut Self {
        self.extra_includes.push(Include::css(url));
        self
    }

    /// Add an inline script block (raw JS, no tags).
    pub fn add_script(&mut self, source: impl Into<String>) -> &mut Self {
        self.scripts.push(source.into());
        self
    }

    /// The deduplicated include manifest, page includes first, then children
    /// in order.
    pub fn includes(&self) -> Vec<Include> {
        let mut manifest: Vec<Include> = Vec::new();
        let mut push = |include: Include, manifest: &mut Vec<Include>| {
            if !manifest.contains(&include) {
                manifest.push(include);
            }
        };
        for include in &self.extra_includes {
            push(include.clone(), &mut manifest);
        }
        for child in &self.children {
            for include in child.includes() {
                push(include, &mut manifest);
            }
        }
        manifest
    }

    /// Render the full document.
    pub fn render(&self) -> String {
        let mut head = String::new();
        for include in self.includes() {
            match include {
                Include::Css(url) => {
                    head.push_str(&format!(
                        "    <link rel='stylesheet' href='{url}'/>\n"
                    ));
                }
                Include::Js(url) => {
                    head.push_str(&format!("    <script src='{url}'></script>\n"));
                }
            }
        }
        for script in &self.scripts {
            head.push_str(&format!("    <script>\n{script}\n    </script>\n"));
        }

        let mut body = String::new();
        body.push_str(&format!("    <h1>{}</h1>\n", self.title));
        for child in &self.children {
            body.push_str("    ");
            body.push_str(&child.render());
            body.push('\n');
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n    <title>{title}</title>\n\
             {head}</head>\n<body>\n{body}</body>\n</html>",
            title = self.title,
            head = head,
            body = body,
        )
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("title", &self.title)
            .field("children", &self.children.len())
            .field("includes", &self.includes())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Fragment {
        html: &'static str,
        includes: Vec<Include>,
    }

    impl Render for Fragment {
        fn render(&self) -> String {
            self.html.to_owned()
        }
        fn includes(&self) -> Vec<Include> {
            self.includes.clone()
        }
    }

    #[test]
    fn renders_title_and_children_in_order() {
        let mut page = Page::new("Demo");
        page.add(Fragment {
            html: "<p id='a'></p>",
            includes: vec![],
        });
        page.add(Fragment {
            html: "<p id='b'></p>",
            includes: vec![],
        });
        let html = page.render();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Demo</title>"));
        assert!(html.contains("<h1>Demo</h1>"));
        let a = html.find("id='a'").unwrap();
        let b = html.find("id='b'").unwrap();
        assert!(a < b);
    }

    #[test]
    fn includes_are_deduplicated_in_first_seen_order() {
        let mut page = Page::new("Demo");
        page.add_css("/w2ui.css");
        page.add(Fragment {
            html: "",
            includes: vec![Include::css("/w2ui.css"), Include::js("/w2ui.js")],
        });
        page.add(Fragment {
            html: "",
            includes: vec![Include::js("/w2ui.js")],
        });
        assert_eq!(
            page.includes(),
            vec![Include::css("/w2ui.css"), Include::js("/w2ui.js")]
        );
        let html = page.render();
        assert_eq!(html.matches("/w2ui.js").count(), 1);
    }

    #[test]
    fn inline_scripts_land_in_head() {
        let mut page = Page::new("Demo");
        page.add_script("console.log('ready');");
        assert!(page.render().contains("console.log('ready');"));
    }
}
