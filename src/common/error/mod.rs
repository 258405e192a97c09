//! Unified error types for quire.
//!
//! Every fallible operation in the crate (content mutation, field insertion,
//! persistence) reports through the single [`Error`] enum defined here.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
