//! # webloom
//!
//! A server-side HTML widget toolkit: build pages from typed widgets, and let
//! the toolkit keep browser and server state coherent over a polling or push
//! transport.
//!
//! Widgets are cheap clonable handles over shared state. Constructing a
//! widget registers its endpoints (idempotently) with the chosen transport;
//! rendering emits the markup plus a small client adapter script; server-side
//! setters publish changes back out, and DOM events arrive as property
//! snapshots followed by a user callback.
//!
//! ## Core Systems
//!
//! - **[`element`]** — The HTML element base: identity, attributes, children
//! - **[`options`]** — Construction options recognized across the catalog
//! - **[`route`]** — Route key derivation and the endpoint registry facade
//! - **[`transport`]** — Polling and push synchronization, commands, adapters
//! - **[`widget`]** — The widget contract: state trait, channel, render seam
//! - **[`widgets`]** — The catalog: button, text box, grid, tree, dialog, ...
//! - **[`layout`]** — Transport-free containers: grids, flow, stacks
//! - **[`page`]** — Page composition with include deduplication
//! - **[`testing`]** — Headless pilots standing in for the browser

// Foundation
pub mod element;
pub mod error;
pub mod options;
pub mod value;

// Addressing and events
pub mod event;
pub mod route;

// Synchronization
pub mod transport;

// Widget system
pub mod widget;
pub mod widgets;

// Composition
pub mod layout;
pub mod page;

// Test harness
pub mod testing;

pub use element::Element;
pub use error::{CallbackError, WidgetError};
pub use options::{OptionKey, OptionValue, WidgetOptions};
pub use page::Page;
pub use transport::{Polling, Push, Transport};
pub use widget::{Include, Render, WidgetHandle};
