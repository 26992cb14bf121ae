//! Tree widget: a hierarchical node view backed by a slotmap arena.
//!
//! Nodes live in a [`SlotMap`] keyed by [`TreeNodeKey`], which keeps keys
//! stable across removals elsewhere in the tree. Removing a node removes its
//! whole subtree. The client is steered by commands (`ADD-NODE`,
//! `REMOVE-NODE`, `OPEN-NODE`, `COLLAPSE-NODE`); clicks come back with the
//! node's wire id. Trees poll on the heavy period.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use slotmap::SlotMap;

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
    OptionKey::Collapsible,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

slotmap::new_key_type! {
    /// Stable key for a tree node.
    pub struct TreeNodeKey;
}

struct TreeNode {
    /// Wire id, unique for the lifetime of the tree.
    id: u64,
    text: String,
    parent: Option<TreeNodeKey>,
    children: Vec<TreeNodeKey>,
    expanded: bool,
}

struct TreeState {
    element: Element,
    id: String,
    nodes: SlotMap<TreeNodeKey, TreeNode>,
    root: TreeNodeKey,
    next_id: u64,
    selected: Option<u64>,
}

impl TreeState {
    fn rebuild(&mut self) {
        self.element.clear_children();
        let children: Vec<TreeNodeKey> = self.nodes[self.root].children.clone();
        for key in children {
            let item = self.build_item(key);
            let _ = self.element.add_child(item);
        }
    }

    fn build_item(&self, key: TreeNodeKey) -> Element {
        let node = &self.nodes[key];
        let mut item = Element::new("li", format!("{}_node{}", self.id, node.id))
            .with_text(node.text.clone());
        if !node.expanded {
            item.add_css_class("collapsed");
        }
        if !node.children.is_empty() {
            let mut list = Element::new("ul", format!("{}_node{}_children", self.id, node.id));
            for child in &node.children {
                let _ = list.add_child(self.build_item(*child));
            }
            let _ = item.add_child(list);
        }
        item
    }

    fn key_for_id(&self, id: u64) -> Option<TreeNodeKey> {
        self.nodes
            .iter()
            .find(|(_, node)| node.id == id)
            .map(|(key, _)| key)
    }

    /// Collect `key` and all its descendants, depth-first.
    fn subtree(&self, key: TreeNodeKey) -> Vec<TreeNodeKey> {
        let mut stack = vec![key];
        let mut collected = Vec::new();
        while let Some(key) = stack.pop() {
            collected.push(key);
            stack.extend(self.nodes[key].children.iter().copied());
        }
        collected
    }
}

impl WidgetState for TreeState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        // Root is structural and not counted.
        map.insert("total".into(), json!(self.nodes.len() - 1));
        map.insert("selected".into(), json!(self.selected));
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        let id = props
            .get("node")
            .and_then(|v| v.as_number().or_else(|| v.as_str()?.parse().ok()))
            .map(|n| n as u64);
        if let Some(id) = id {
            if self.key_for_id(id).is_some() {
                self.selected = Some(id);
            }
        }
    }

    fn adapter(&self) -> AdapterSpec {
        AdapterSpec {
            poll_period_ms: POLL_PERIOD_HEAVY_MS,
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture: vec![FieldBinding::value("node")],
            }],
            command_js: Some("                    applyTreeCommand(el.id, props);".to_owned()),
            ..AdapterSpec::new()
        }
    }
}

/// A command-driven tree view.
#[derive(Clone)]
pub struct Tree {
    core: Core<TreeState>,
}

impl Tree {
    /// Create an empty tree and register its endpoints.
    pub fn new(
        id: &str,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(TreeNode {
            id: 0,
            text: String::new(),
            parent: None,
            children: Vec::new(),
            expanded: true,
        });
        let mut state = TreeState {
            element: Element::new("ul", id).with_css_class("webloom-tree"),
            id: id.to_owned(),
            nodes,
            root,
            next_id: 1,
            selected: None,
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

    /// The structural root. It renders no markup of its own; top-level nodes
    /// are its children.
    pub fn root(&self) -> TreeNodeKey {
        self.core.read(|s| s.root)
    }

    /// Add a node under `parent` and notify the client. Returns the new key.
    pub fn add_node(&self, parent: TreeNodeKey, text: &str) -> Result<TreeNodeKey, WidgetError> {
        let (key, wire_id, parent_id) = self.core.update(|s| {
            if !s.nodes.contains_key(parent) {
                return Err(WidgetError::Validation("parent node is gone".to_owned()));
            }
            let wire_id = s.next_id;
            s.next_id += 1;
            let key = s.nodes.insert(TreeNode {
                id: wire_id,
                text: text.to_owned(),
                parent: Some(parent),
                children: Vec::new(),
                expanded: true,
            });
            s.nodes[parent].children.push(key);
            let parent_id = s.nodes[parent].id;
            s.rebuild();
            Ok((key, wire_id, parent_id))
        })?;
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("ADD-NODE")
                .arg(parent_id)
                .arg(json!({ "id": wire_id, "text": text })),
        );
        Ok(key)
    }

    /// Remove a node and its whole subtree, notifying the client.
    pub fn remove_node(&self, key: TreeNodeKey) -> Result<(), WidgetError> {
        let wire_id = self.core.update(|s| {
            if key == s.root {
                return Err(WidgetError::Validation(
                    "the root node cannot be removed".to_owned(),
                ));
            }
            if !s.nodes.contains_key(key) {
                return Err(WidgetError::Validation("node is gone".to_owned()));
            }
            let wire_id = s.nodes[key].id;
            if let Some(parent) = s.nodes[key].parent {
                s.nodes[parent].children.retain(|c| *c != key);
            }
            for doomed in s.subtree(key) {
                let node = s.nodes.remove(doomed);
                if let Some(node) = node {
                    if s.selected == Some(node.id) {
                        s.selected = None;
                    }
                }
            }
            s.rebuild();
            Ok(wire_id)
        })?;
        self.core.transport().publish_command(
            self.core.channel(),
            Command::new("REMOVE-NODE").arg(wire_id),
        );
        Ok(())
    }

    /// Expand or collapse a node, notifying the client.
    pub fn set_expanded(&self, key: TreeNodeKey, expanded: bool) -> Result<(), WidgetError> {
        let wire_id = self.core.update(|s| {
            let node = s
                .nodes
                .get_mut(key)
                .ok_or_else(|| WidgetError::Validation("node is gone".to_owned()))?;
            node.expanded = expanded;
            let wire_id = node.id;
            s.rebuild();
            Ok::<_, WidgetError>(wire_id)
        })?;
        let cmd = if expanded { "OPEN-NODE" } else { "COLLAPSE-NODE" };
        self.core
            .transport()
            .publish_command(self.core.channel(), Command::new(cmd).arg(wire_id));
        Ok(())
    }

    /// A node's text.
    pub fn node_text(&self, key: TreeNodeKey) -> Option<String> {
        self.core.read(|s| s.nodes.get(key).map(|n| n.text.clone()))
    }

    /// Number of nodes, root excluded.
    pub fn node_count(&self) -> usize {
        self.core.read(|s| s.nodes.len() - 1)
    }

    /// Wire id of the selected node.
    pub fn selected(&self) -> Option<u64> {
        self.core.read(|s| s.selected)
    }

    /// Register the node click callback.
    pub fn on_click<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("click", Arc::new(callback));
    }
}

impl WidgetHandle for Tree {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for Tree {
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
