//! Layouts: transport-free containers that arrange renderables in markup.

pub mod flow;
pub mod grid;
pub mod stack;

pub use flow::FlowLayout;
pub use grid::{GridLayout, SimpleGridLayout};
pub use stack::{HorizontalLayout, VerticalLayout};
