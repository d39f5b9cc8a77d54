//! Errors raised by the crate's own tooling
//!
//! The client-facing error taxonomy lives in [`crate::taxonomy`]. This module
//! only covers failures of the surrounding machinery: configuration files,
//! reply input decoding and report output.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, Result, ToolError};
