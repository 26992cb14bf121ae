//! Client adapter templates.
//!
//! The inline `<script>` blocks a widget emits are a rendering detail kept
//! apart from widget semantics: a widget only declares an [`AdapterSpec`]
//! (which JSON fields map to which DOM targets, which DOM events fire which
//! server events, its poll period) and the transport picks the matching
//! template here. Swapping templates never touches a widget.
//!
//! Sync/event errors are passed to the notifier explicitly as the `err`
//! argument; the poll loop continues after notifying.

use crate::route::RouteKey;

/// Default poll period for light input widgets.
pub const POLL_PERIOD_MS: u64 = 500;

/// Poll period for heavy composite widgets (grid, tree, toolbar).
pub const POLL_PERIOD_HEAVY_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// AdapterSpec
// ---------------------------------------------------------------------------

/// Where a synced JSON field lands on the DOM element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomTarget {
    /// `el.value`.
    Value,
    /// A named element property, e.g. `disabled`, `checked`, `readOnly`.
    Prop(&'static str),
    /// `el.textContent`.
    Text,
    /// A named HTML attribute.
    Attr(&'static str),
}

/// One observable field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    /// JSON key in the sync payload.
    pub key: &'static str,
    /// DOM destination.
    pub target: DomTarget,
}

impl FieldBinding {
    /// Bind a JSON key to `el.value`.
    pub const fn value(key: &'static str) -> Self {
        Self {
            key,
            target: DomTarget::Value,
        }
    }

    /// Bind a JSON key to a DOM property.
    pub const fn prop(key: &'static str, prop: &'static str) -> Self {
        Self {
            key,
            target: DomTarget::Prop(prop),
        }
    }
}

/// One DOM event wired to a server event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWiring {
    /// DOM event name (`click`, `change`, `submit`).
    pub dom_event: &'static str,
    /// Server event name (endpoint suffix / `fire_<name>_event`).
    pub event: &'static str,
    /// Fields captured from the DOM at dispatch time.
    pub capture: Vec<FieldBinding>,
}

/// The full client adapter declaration for one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSpec {
    /// Poll period in milliseconds (polling transport only).
    pub poll_period_ms: u64,
    /// Sync payload → DOM mappings.
    pub fields: Vec<FieldBinding>,
    /// DOM event → server event wirings.
    pub events: Vec<EventWiring>,
    /// Extra JS applied when the payload carries a `cmd` field; the snippet
    /// sees `props` and `el` in scope.
    pub command_js: Option<String>,
}

impl AdapterSpec {
    /// A spec with no fields or events and the default poll period.
    pub fn new() -> Self {
        Self {
            poll_period_ms: POLL_PERIOD_MS,
            fields: Vec::new(),
            events: Vec::new(),
            command_js: None,
        }
    }
}

impl Default for AdapterSpec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Template helpers
// ---------------------------------------------------------------------------

fn apply_field_js(binding: &FieldBinding) -> String {
    let key = binding.key;
    match binding.target {
        DomTarget::Value => format!("el.value = props['{key}'];"),
        DomTarget::Prop(prop) => format!("el['{prop}'] = props['{key}'];"),
        DomTarget::Text => format!("el.textContent = props['{key}'];"),
        DomTarget::Attr(attr) => format!("el.setAttribute('{attr}', props['{key}']);"),
    }
}

fn capture_field_js(binding: &FieldBinding) -> String {
    let key = binding.key;
    match binding.target {
        DomTarget::Value => format!("'{key}': el.value"),
        DomTarget::Prop(prop) => format!("'{key}': el['{prop}']"),
        DomTarget::Text => format!("'{key}': el.textContent"),
        DomTarget::Attr(attr) => format!("'{key}': el.getAttribute('{attr}')"),
    }
}

fn apply_block(spec: &AdapterSpec) -> String {
    let mut block = String::new();
    for field in &spec.fields {
        block.push_str("                ");
        block.push_str(&apply_field_js(field));
        block.push('\n');
    }
    if let Some(command_js) = &spec.command_js {
        block.push_str("                if (props.cmd) {\n");
        block.push_str(command_js);
        block.push_str("\n                }\n");
    }
    block
}

// ---------------------------------------------------------------------------
// Polling template
// ---------------------------------------------------------------------------

/// The polling adapter: a self-rescheduling fetch loop against the widget's
/// sync endpoint, plus one fetch-on-DOM-event wiring per registered event.
pub fn polling_script(widget_id: &str, props_route: &RouteKey, spec: &AdapterSpec) -> String {
    let mut script = String::from("<script>\n(function(){\n");
    script.push_str(&format!(
        "    var el = document.getElementById('{widget_id}');\n"
    ));

    // Poll loop.
    script.push_str(&format!(
        "    (function poll(){{\n        setTimeout(function(){{\n            \
         fetch('{path}').then(function(res){{\n                \
         if (!res.ok) {{ throw new Error('status ' + res.status); }}\n                \
         return res.json();\n            \
         }}).then(function(props){{\n{apply}                poll();\n            \
         }}).catch(function(err){{\n                \
         console.warn('sync failed', err);\n                poll();\n            \
         }});\n        }}, {period});\n    }})();\n",
        path = props_route.path(),
        apply = apply_block(spec),
        period = spec.poll_period_ms,
    ));

    // Event wirings.
    for wiring in &spec.events {
        let captures: Vec<String> = wiring.capture.iter().map(capture_field_js).collect();
        script.push_str(&format!(
            "    el.addEventListener('{dom_event}', function(){{\n        \
             var params = new URLSearchParams({{{captures}}});\n        \
             fetch('/{key}_{event}?' + params).then(function(res){{\n            \
             if (!res.ok) {{ throw new Error('status ' + res.status); }}\n        \
             }}).catch(function(err){{ console.warn('event failed', err); }});\n    }});\n",
            dom_event = wiring.dom_event,
            captures = captures.join(", "),
            key = props_key_base(props_route),
            event = wiring.event,
        ));
    }

    script.push_str("})();\n</script>");
    script
}

/// Strip the trailing `_props` suffix to recover the widget's base key.
fn props_key_base(props_route: &RouteKey) -> &str {
    props_route
        .as_str()
        .strip_suffix("_props")
        .unwrap_or(props_route.as_str())
}

// ---------------------------------------------------------------------------
// Push template
// ---------------------------------------------------------------------------

/// The push adapter: connects the widget's namespace, listens for
/// `sync_properties_<id>` messages, and emits `fire_<event>_event` messages
/// on DOM events. Expects the page-level socket runtime include.
pub fn push_script(widget_id: &str, namespace: &str, spec: &AdapterSpec) -> String {
    let mut script = String::from("<script>\n(function(){\n");
    script.push_str(&format!(
        "    var el = document.getElementById('{widget_id}');\n    \
         var socket = webloomConnect('{namespace}');\n"
    ));

    script.push_str(&format!(
        "    socket.on('sync_properties_{widget_id}', function(props){{\n{apply}    }});\n",
        apply = apply_block(spec),
    ));

    for wiring in &spec.events {
        let captures: Vec<String> = wiring.capture.iter().map(capture_field_js).collect();
        script.push_str(&format!(
            "    el.addEventListener('{dom_event}', function(){{\n        \
             socket.emit('fire_{event}_event', {{{captures}}});\n    }});\n",
            dom_event = wiring.dom_event,
            captures = captures.join(", "),
            event = wiring.event,
        ));
    }

    script.push_str(
        "    socket.on('error', function(data){ console.warn(data.message); });\n    \
         socket.on('warning', function(data){ console.warn(data.message); });\n",
    );
    script.push_str("})();\n</script>");
    script
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> AdapterSpec {
        AdapterSpec {
            poll_period_ms: POLL_PERIOD_MS,
            fields: vec![
                FieldBinding::value("title"),
                FieldBinding::prop("disabled", "disabled"),
            ],
            events: vec![EventWiring {
                dom_event: "click",
                event: "click",
                capture: vec![
                    FieldBinding::value("title"),
                    FieldBinding::prop("disabled", "disabled"),
                ],
            }],
            command_js: None,
        }
    }

    #[test]
    fn polling_script_fetches_props_route() {
        let route = RouteKey::derive("m", "b", Some("props"));
        let script = polling_script("b", &route, &spec());
        assert!(script.contains("fetch('/m_b_props')"));
        assert!(script.contains("setTimeout"));
        assert!(script.contains("el.value = props['title'];"));
        assert!(script.contains("el['disabled'] = props['disabled'];"));
    }

    #[test]
    fn polling_script_wires_events_to_base_key() {
        let route = RouteKey::derive("m", "b", Some("props"));
        let script = polling_script("b", &route, &spec());
        assert!(script.contains("addEventListener('click'"));
        assert!(script.contains("fetch('/m_b_click?'"));
        assert!(script.contains("'title': el.value"));
    }

    #[test]
    fn polling_script_passes_error_explicitly() {
        let route = RouteKey::derive("m", "b", Some("props"));
        let script = polling_script("b", &route, &spec());
        assert!(script.contains("catch(function(err)"));
        assert!(script.contains("poll();"));
    }

    #[test]
    fn push_script_uses_namespace_and_fire_events() {
        let script = push_script("b", "/m_b_click", &spec());
        assert!(script.contains("webloomConnect('/m_b_click')"));
        assert!(script.contains("socket.on('sync_properties_b'"));
        assert!(script.contains("socket.emit('fire_click_event'"));
    }

    #[test]
    fn command_js_is_gated_on_cmd_field() {
        let mut s = spec();
        s.command_js = Some("                    applyGridCommand(el, props);".into());
        let route = RouteKey::derive("m", "g", Some("props"));
        let script = polling_script("g", &route, &s);
        assert!(script.contains("if (props.cmd)"));
        assert!(script.contains("applyGridCommand"));
    }

    #[test]
    fn heavy_period_lands_in_template() {
        let mut s = spec();
        s.poll_period_ms = POLL_PERIOD_HEAVY_MS;
        let route = RouteKey::derive("m", "g", Some("props"));
        let script = polling_script("g", &route, &s);
        assert!(script.contains("}, 10000);"));
    }
}
