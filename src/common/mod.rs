//! Common types and utilities shared across the crate.
//!
//! Errors, node identity, built-in document properties, and unit conversions
//! used by both the content model and the persistence layer.

// Submodule declarations
pub mod error;
pub mod id;
pub mod metadata;
pub mod unit;

// Re-exports for convenience
pub use error::{Error, Result};
pub use id::NodeId;
pub use metadata::BuiltInProperties;
