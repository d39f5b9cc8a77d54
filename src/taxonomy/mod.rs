//! Error taxonomy for the MongoDB client
//!
//! This module provides:
//! - The error hierarchy ([`ErrorKind`] tags and [`MongoError`] values)
//! - The classifier that turns raw server replies into errors
//! - The policy table telling callers whether to retry or refresh topology
//!
//! # Example
//!
//! ```rust
//! use mongo_errors::taxonomy::{ErrorKind, RawReply, ServerReply, classify};
//!
//! let reply = ServerReply::new("E11000 duplicate key").with_code(11000);
//! let err = classify(&RawReply::Server(reply));
//!
//! assert!(err.is_a(ErrorKind::WriteError));
//! assert!(!err.is_retryable());
//! ```

pub mod classifier;
pub mod failure;
pub mod kind;
pub mod policy;
pub mod reply;
pub mod report;

// Re-export commonly used types
pub use classifier::{Classifier, StalePrimaryPatterns, classify};
pub use failure::{
    BULK_WRITE_ERROR_CODE, BulkWriteFailure, MongoError, ServerFailure, check_document_size,
};
pub use kind::{Ancestors, ErrorKind};
pub use policy::{POLICY_TABLE, Policy, policy_for};
pub use reply::{RawReply, ReplySource, ServerReply, TransportFailure};
pub use report::ErrorReport;
