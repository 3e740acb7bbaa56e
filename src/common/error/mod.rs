//! Unified error types for ODS extraction.
//!
//! This module provides a single error type covering archive access, markup
//! parsing, sheet filtering and output, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
