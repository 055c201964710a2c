//! CampusBridge Shared Library
//!
//! This crate contains the wire types and input validation shared between
//! the backend service and its test suites.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
