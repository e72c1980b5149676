//! Core data types and error enums.

pub mod errors;
pub mod model;
