//! Application layer: persistence, execution, editing, and command dispatch.

pub mod bootstrap;
pub mod editor;
pub mod manager;
pub mod runner;
pub mod store;
pub mod transfer;
