//! Deterministic route-key derivation.
//!
//! Every widget endpoint and push namespace is addressed by a key derived
//! from `(module, widget id, event suffix)`. The module string is expected to
//! come from `module_path!()` at the widget's definition site; `.` and `::`
//! separators are folded to `_` so the key is a single URL segment. The same
//! triple always derives the same key, which is what makes endpoint
//! registration idempotent.

use std::fmt;

/// A derived endpoint key, unique per `(module, widget id, suffix)` triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(String);

/// Fold module-path separators into URL-safe underscores.
fn sanitize(segment: &str) -> String {
    segment.replace("::", "_").replace('.', "_")
}

impl RouteKey {
    /// Derive the key for a widget endpoint.
    ///
    /// With a suffix the key is `{module}_{id}_{suffix}`; without, it is
    /// `{module}_{id}`.
    pub fn derive(module: &str, widget_id: &str, suffix: Option<&str>) -> Self {
        let mut key = format!("{}_{}", sanitize(module), sanitize(widget_id));
        if let Some(suffix) = suffix {
            key.push('_');
            key.push_str(&sanitize(suffix));
        }
        RouteKey(key)
    }

    /// The key as a bare string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as a rooted URL path (`/{key}`).
    pub fn path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
