//! Headless testing harness.
//!
//! The pilots drive widgets without a browser: [`PollingPilot`] plays the
//! role of the polling client against an in-memory route host, and
//! [`PushPilot`] plays a socket client against a message bus.

pub mod pilot;

pub use pilot::{PollingPilot, PushPilot};
