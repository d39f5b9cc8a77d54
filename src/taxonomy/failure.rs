//! Error values raised by the client
//!
//! [`MongoError`] has one variant per [`ErrorKind`]. Values are built once,
//! where the failure is detected, and are never modified afterwards.

use bson::{Bson, Document, doc};
use thiserror::Error;

use super::kind::ErrorKind;
use super::policy::{Policy, policy_for};

/// Server error code carried by every bulk write failure.
pub const BULK_WRITE_ERROR_CODE: i32 = 65;

/// Failure reported by the server for a single operation.
///
/// `code` and `details` are kept exactly as the server sent them.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ServerFailure {
    message: String,
    code: Option<i32>,
    details: Option<Document>,
}

impl ServerFailure {
    pub fn new(
        message: impl Into<String>,
        code: Option<i32>,
        details: Option<Document>,
    ) -> Self {
        Self {
            message: message.into(),
            code,
            details,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error code returned by the server, if any.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// The complete error document returned by the server.
    ///
    /// Through mongos this may hold one sub-document per failing shard.
    pub fn details(&self) -> Option<&Document> {
        self.details.as_ref()
    }
}

/// Aggregate failure of a batch of writes.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct BulkWriteFailure {
    message: String,
    results: Vec<Document>,
    details: Document,
}

impl BulkWriteFailure {
    pub const MESSAGE: &'static str = "batch op errors occurred";

    /// Failure for `results`, one outcome per attempted operation.
    ///
    /// Until a server reply is attached, `details` holds the results.
    pub fn new(results: Vec<Document>) -> Self {
        let details = doc! { "results": results.clone() };
        Self {
            message: Self::MESSAGE.to_string(),
            results,
            details,
        }
    }

    /// Keep the server's full reply alongside the per-item outcomes.
    pub fn with_details(mut self, details: Document) -> Self {
        self.details = details;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Always [`BULK_WRITE_ERROR_CODE`].
    pub fn code(&self) -> Option<i32> {
        Some(BULK_WRITE_ERROR_CODE)
    }

    pub fn results(&self) -> &[Document] {
        &self.results
    }

    pub fn details(&self) -> Option<&Document> {
        Some(&self.details)
    }
}

/// Any failure raised by the client, tagged by its most specific kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MongoError {
    #[error("{message}")]
    Client { message: String },

    #[error("{message}")]
    ConnectionFailure { message: String },

    /// Whether the operation succeeded is unknown.
    #[error("{message}")]
    AutoReconnect { message: String, errors: Vec<Bson> },

    /// Socket timeout on an open connection; a write may or may not have applied.
    #[error("{message}")]
    NetworkTimeout { message: String, errors: Vec<Bson> },

    /// The node is no longer primary, or is recovering.
    #[error("{message}")]
    StalePrimary { message: String, errors: Vec<Bson> },

    #[error("{message}")]
    Configuration { message: String },

    #[error("{message}")]
    InvalidUri { message: String },

    #[error("{0}")]
    OperationFailure(ServerFailure),

    #[error("{0}")]
    CursorNotFound(ServerFailure),

    /// Server-side `maxTimeMS` budget was exceeded.
    #[error("{0}")]
    ExecutionTimeout(ServerFailure),

    #[error("{0}")]
    WriteConcern(ServerFailure),

    #[error("{0}")]
    Write(ServerFailure),

    /// `wtimeout` expired before replication completed.
    #[error("{0}")]
    WriteTimeout(ServerFailure),

    #[error("{0}")]
    DuplicateKey(ServerFailure),

    #[error("{0}")]
    BulkWrite(BulkWriteFailure),

    #[error("{message}")]
    InvalidOperation { message: String },

    #[error("{message}")]
    InvalidName { message: String },

    #[error("{message}")]
    CollectionInvalid { message: String },

    #[error("{message}")]
    ExceededMaxWaiters { message: String },

    #[error("{message}")]
    InvalidDocument { message: String },

    #[error("{message}")]
    DocumentTooLarge { message: String },
}

impl MongoError {
    /// Most specific kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MongoError::Client { .. } => ErrorKind::ClientError,
            MongoError::ConnectionFailure { .. } => ErrorKind::ConnectionFailure,
            MongoError::AutoReconnect { .. } => ErrorKind::AutoReconnect,
            MongoError::NetworkTimeout { .. } => ErrorKind::NetworkTimeout,
            MongoError::StalePrimary { .. } => ErrorKind::StalePrimaryError,
            MongoError::Configuration { .. } => ErrorKind::ConfigurationError,
            MongoError::InvalidUri { .. } => ErrorKind::InvalidUriError,
            MongoError::OperationFailure(_) => ErrorKind::OperationFailure,
            MongoError::CursorNotFound(_) => ErrorKind::CursorNotFoundError,
            MongoError::ExecutionTimeout(_) => ErrorKind::ExecutionTimeoutError,
            MongoError::WriteConcern(_) => ErrorKind::WriteConcernError,
            MongoError::Write(_) => ErrorKind::WriteError,
            MongoError::WriteTimeout(_) => ErrorKind::WriteTimeoutError,
            MongoError::DuplicateKey(_) => ErrorKind::DuplicateKeyError,
            MongoError::BulkWrite(_) => ErrorKind::BulkWriteError,
            MongoError::InvalidOperation { .. } => ErrorKind::InvalidOperationError,
            MongoError::InvalidName { .. } => ErrorKind::InvalidNameError,
            MongoError::CollectionInvalid { .. } => ErrorKind::CollectionInvalidError,
            MongoError::ExceededMaxWaiters { .. } => ErrorKind::ExceededMaxWaitersError,
            MongoError::InvalidDocument { .. } => ErrorKind::InvalidDocument,
            MongoError::DocumentTooLarge { .. } => ErrorKind::DocumentTooLargeError,
        }
    }

    pub fn is_a(&self, ancestor: ErrorKind) -> bool {
        self.kind().is_a(ancestor)
    }

    pub fn message(&self) -> &str {
        match self {
            MongoError::Client { message }
            | MongoError::ConnectionFailure { message }
            | MongoError::AutoReconnect { message, .. }
            | MongoError::NetworkTimeout { message, .. }
            | MongoError::StalePrimary { message, .. }
            | MongoError::Configuration { message }
            | MongoError::InvalidUri { message }
            | MongoError::InvalidOperation { message }
            | MongoError::InvalidName { message }
            | MongoError::CollectionInvalid { message }
            | MongoError::ExceededMaxWaiters { message }
            | MongoError::InvalidDocument { message }
            | MongoError::DocumentTooLarge { message } => message.as_str(),
            MongoError::BulkWrite(failure) => failure.message(),
            other => other.server_failure().map_or("", ServerFailure::message),
        }
    }

    /// Server failure payload for every `OperationFailure` kind except bulk writes.
    pub fn server_failure(&self) -> Option<&ServerFailure> {
        match self {
            MongoError::OperationFailure(failure)
            | MongoError::CursorNotFound(failure)
            | MongoError::ExecutionTimeout(failure)
            | MongoError::WriteConcern(failure)
            | MongoError::Write(failure)
            | MongoError::WriteTimeout(failure)
            | MongoError::DuplicateKey(failure) => Some(failure),
            _ => None,
        }
    }

    /// Server error code; `None` outside the `OperationFailure` subtree.
    pub fn code(&self) -> Option<i32> {
        match self {
            MongoError::BulkWrite(failure) => failure.code(),
            other => other.server_failure().and_then(ServerFailure::code),
        }
    }

    /// Server error document; `None` outside the `OperationFailure` subtree.
    pub fn details(&self) -> Option<&Document> {
        match self {
            MongoError::BulkWrite(failure) => failure.details(),
            other => other.server_failure().and_then(ServerFailure::details),
        }
    }

    /// Per-item outcomes of a failed batch.
    pub fn results(&self) -> Option<&[Document]> {
        match self {
            MongoError::BulkWrite(failure) => Some(failure.results()),
            _ => None,
        }
    }

    /// Underlying causes of a lost connection.
    pub fn errors(&self) -> Option<&[Bson]> {
        match self {
            MongoError::AutoReconnect { errors, .. }
            | MongoError::NetworkTimeout { errors, .. }
            | MongoError::StalePrimary { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn policy(&self) -> Policy {
        policy_for(self.kind())
    }

    pub fn is_retryable(&self) -> bool {
        self.policy().retryable
    }

    /// Whether the topology monitor should rediscover the primary.
    pub fn needs_topology_refresh(&self) -> bool {
        self.policy().triggers_topology_refresh
    }

    /* ========================= Constructors ========================= */

    pub fn auto_reconnect(message: impl Into<String>, errors: Vec<Bson>) -> Self {
        MongoError::AutoReconnect {
            message: message.into(),
            errors,
        }
    }

    pub fn network_timeout(message: impl Into<String>, errors: Vec<Bson>) -> Self {
        MongoError::NetworkTimeout {
            message: message.into(),
            errors,
        }
    }

    pub fn stale_primary(message: impl Into<String>, errors: Vec<Bson>) -> Self {
        MongoError::StalePrimary {
            message: message.into(),
            errors,
        }
    }

    pub fn connection_failure(message: impl Into<String>) -> Self {
        MongoError::ConnectionFailure {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        MongoError::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_uri(message: impl Into<String>) -> Self {
        MongoError::InvalidUri {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        MongoError::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn invalid_name(message: impl Into<String>) -> Self {
        MongoError::InvalidName {
            message: message.into(),
        }
    }

    pub fn collection_invalid(message: impl Into<String>) -> Self {
        MongoError::CollectionInvalid {
            message: message.into(),
        }
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        MongoError::InvalidDocument {
            message: message.into(),
        }
    }

    pub fn bulk_write(results: Vec<Document>) -> Self {
        MongoError::BulkWrite(BulkWriteFailure::new(results))
    }

    /// A thread found `max_pool_size * wait_queue_multiple` waiters already queued.
    pub fn exceeded_max_waiters(max_pool_size: u32, wait_queue_multiple: u32) -> Self {
        MongoError::ExceededMaxWaiters {
            message: format!(
                "exceeded max waiters: {} threads already waiting for a connection",
                u64::from(max_pool_size) * u64::from(wait_queue_multiple)
            ),
        }
    }

    /// An encoded document of `size` bytes exceeds the server's `max` bytes.
    pub fn document_too_large(size: usize, max: usize) -> Self {
        MongoError::DocumentTooLarge {
            message: format!(
                "BSON document too large ({size} bytes) - the connected server supports \
                 BSON document sizes up to {max} bytes."
            ),
        }
    }
}

/// Reject an encoded document larger than the server's `maxBsonObjectSize`.
pub fn check_document_size(size: usize, max: usize) -> Result<(), MongoError> {
    if size > max {
        return Err(MongoError::document_too_large(size, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_kind_matches_variant() {
        let failure = ServerFailure::new("E11000 duplicate key", Some(11000), None);
        let err = MongoError::DuplicateKey(failure);

        assert_eq!(err.kind(), ErrorKind::DuplicateKeyError);
        assert!(err.is_a(ErrorKind::WriteError));
        assert!(err.is_a(ErrorKind::OperationFailure));
        assert!(err.is_a(ErrorKind::ClientError));
        assert!(!err.is_a(ErrorKind::WriteConcernError));
        assert_eq!(err.code(), Some(11000));
        assert_eq!(err.message(), "E11000 duplicate key");
        assert_eq!(err.to_string(), "E11000 duplicate key");
    }

    #[test]
    fn test_bulk_write_always_code_65() {
        let results = vec![doc! { "ok": true }, doc! { "ok": false, "code": 11000 }];
        let err = MongoError::bulk_write(results.clone());

        assert_eq!(err.kind(), ErrorKind::BulkWriteError);
        assert_eq!(err.code(), Some(BULK_WRITE_ERROR_CODE));
        assert_eq!(err.results(), Some(results.as_slice()));
        assert_eq!(err.message(), "batch op errors occurred");
        assert_eq!(err.details(), Some(&doc! { "results": results.clone() }));
    }

    #[test]
    fn test_bulk_write_server_reply_replaces_details() {
        let reply = doc! {
            "ok": 1,
            "nInserted": 1,
            "writeErrors": [{ "index": 1, "code": 11000 }],
        };
        let failure =
            BulkWriteFailure::new(vec![doc! { "ok": true }]).with_details(reply.clone());

        assert_eq!(failure.details(), Some(&reply));
        assert_eq!(failure.results().len(), 1);
    }

    #[test]
    fn test_connection_errors_carry_causes() {
        let causes = vec![Bson::String("connection reset by peer".into())];
        let err = MongoError::network_timeout("timed out", causes.clone());

        assert_eq!(err.errors(), Some(causes.as_slice()));
        assert!(err.is_retryable());
        assert!(!err.needs_topology_refresh());
        assert!(err.code().is_none());
        assert!(err.details().is_none());

        let err = MongoError::stale_primary("not master", Vec::new());
        assert!(err.is_retryable());
        assert!(err.needs_topology_refresh());
        assert!(err.is_a(ErrorKind::ConnectionFailure));
    }

    #[test]
    fn test_client_misuse_kinds() {
        let err = MongoError::invalid_operation("cannot iterate an exhausted cursor");
        assert_eq!(err.kind(), ErrorKind::InvalidOperationError);
        assert!(err.is_a(ErrorKind::ClientError));
        assert!(!err.is_retryable());
        assert!(err.errors().is_none());

        let err = MongoError::invalid_uri("mongodb:// has no host");
        assert!(err.is_a(ErrorKind::ConfigurationError));
    }

    #[test]
    fn test_document_too_large() {
        assert!(check_document_size(16 * 1024 * 1024, 16 * 1024 * 1024).is_ok());

        let err = check_document_size(17_000_000, 16_777_216).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentTooLargeError);
        assert!(err.is_a(ErrorKind::InvalidDocument));
        assert!(!err.is_a(ErrorKind::ClientError));
        assert!(err.message().contains("17000000 bytes"));
        assert!(err.message().contains("16777216 bytes"));
    }

    #[test]
    fn test_exceeded_max_waiters_is_independent() {
        let err = MongoError::exceeded_max_waiters(100, 5);
        assert_eq!(err.kind(), ErrorKind::ExceededMaxWaitersError);
        assert!(!err.is_a(ErrorKind::ClientError));
        assert!(err.message().contains("500"));
    }

    #[test]
    fn test_equality_is_by_kind_and_fields() {
        let details = doc! { "ok": 0, "errmsg": "boom", "code": 2 };
        let a = MongoError::OperationFailure(ServerFailure::new(
            "boom",
            Some(2),
            Some(details.clone()),
        ));
        let b = MongoError::OperationFailure(ServerFailure::new(
            "boom",
            Some(2),
            Some(details.clone()),
        ));
        let c = MongoError::Write(ServerFailure::new("boom", Some(2), Some(details)));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MongoError>();
    }
}
