//! Terminal settings panel.

pub mod app;
pub mod components;
