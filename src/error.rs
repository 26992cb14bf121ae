//! Error types shared across the crate.
//!
//! Construction and tree-assembly errors surface to the caller as
//! [`WidgetError`]. User callbacks report failure through [`CallbackError`],
//! which the transports translate into their channel-specific error shape
//! (HTTP 500 body for polling, an `error` message for push).

/// Errors raised by widget construction and tree assembly.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// A construction parameter failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A construction option key is not part of the recognized set.
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    /// `add_child` was called with a widget that already has a parent.
    #[error("widget `{0}` already has a parent (`{1}`)")]
    InvalidParent(String, String),

    /// `remove_child` was called with a widget that is not a child.
    #[error("widget `{0}` is not a child of `{1}`")]
    NotAChild(String, String),

    /// `add_child` was called with an id already present among the siblings.
    #[error("widget `{1}` already has a child with id `{0}`")]
    DuplicateChild(String, String),
}

/// Failure returned by a user event callback.
///
/// The message is forwarded to the client; server state changes made before
/// the callback ran are preserved.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    /// Create a callback error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
