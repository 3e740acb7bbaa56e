//! Common types and utilities shared by the extraction pipeline.
//!
//! This module provides the unified error type and the incremental XML
//! tokenization layer the ODS decoder is built on.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
