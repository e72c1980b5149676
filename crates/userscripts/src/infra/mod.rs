//! Infrastructure adapters for config, logging, and syntax highlighting.

pub mod config;
pub mod highlight;
pub mod logging;
