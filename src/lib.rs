//! MongoDB client error taxonomy
//!
//! This library tells calling code *why* an operation against a MongoDB
//! deployment failed, and what to do about it.
//!
//! # Modules
//!
//! - `taxonomy`: Error kinds, error values, the reply classifier and the policy table
//! - `config`: Configuration management
//! - `error`: Errors raised by the crate's own tooling
//! - `formatter`: Report and table rendering
//! - `cli`: The `mongo-classify` command-line interface
//!
//! # Example
//!
//! ```
//! use mongo_errors::{ErrorKind, RawReply, ServerReply, classify};
//!
//! let reply = ServerReply::new("not master").with_code_name("NotMaster");
//! let err = classify(&RawReply::Server(reply));
//!
//! assert!(err.is_a(ErrorKind::AutoReconnect));
//! assert!(err.is_retryable());
//! assert!(err.needs_topology_refresh());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod taxonomy;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ToolError};
pub use taxonomy::{
    Classifier, ErrorKind, ErrorReport, MongoError, Policy, RawReply, ServerReply,
    TransportFailure, classify, policy_for,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
