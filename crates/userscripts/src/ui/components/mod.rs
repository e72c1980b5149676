//! Collection of reusable TUI components.

pub mod dialog;
pub mod editor;
pub mod script_list;
pub mod summary;
