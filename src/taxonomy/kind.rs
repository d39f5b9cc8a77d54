//! Error kind tags and the is-a hierarchy between them
//!
//! Every [`ErrorKind`] names exactly one node of a fixed tree. Each node knows
//! its parent, so the full ancestor chain is available without any runtime
//! inheritance. `is_a` is a membership check against that chain.

use std::fmt;

use serde::{Serialize, Serializer};

/// Tag identifying one node in the error hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Root of every client-raised failure.
    ClientError,
    ConnectionFailure,
    /// Outcome of the operation is unknown; the client will reconnect.
    AutoReconnect,
    NetworkTimeout,
    /// Server answered "not master" or "node is recovering".
    StalePrimaryError,
    ConfigurationError,
    InvalidUriError,
    /// Server rejected an operation.
    OperationFailure,
    CursorNotFoundError,
    ExecutionTimeoutError,
    WriteConcernError,
    WriteError,
    WriteTimeoutError,
    DuplicateKeyError,
    BulkWriteError,
    InvalidOperationError,
    InvalidNameError,
    CollectionInvalidError,
    /// Pool wait-queue is full. Not a `ClientError`.
    ExceededMaxWaitersError,
    /// Document could not be encoded. Not a `ClientError`.
    InvalidDocument,
    DocumentTooLargeError,
}

impl ErrorKind {
    /// Every kind, parents before children.
    pub const ALL: [ErrorKind; 21] = [
        ErrorKind::ClientError,
        ErrorKind::ConnectionFailure,
        ErrorKind::AutoReconnect,
        ErrorKind::NetworkTimeout,
        ErrorKind::StalePrimaryError,
        ErrorKind::ConfigurationError,
        ErrorKind::InvalidUriError,
        ErrorKind::OperationFailure,
        ErrorKind::CursorNotFoundError,
        ErrorKind::ExecutionTimeoutError,
        ErrorKind::WriteConcernError,
        ErrorKind::WriteError,
        ErrorKind::WriteTimeoutError,
        ErrorKind::DuplicateKeyError,
        ErrorKind::BulkWriteError,
        ErrorKind::InvalidOperationError,
        ErrorKind::InvalidNameError,
        ErrorKind::CollectionInvalidError,
        ErrorKind::ExceededMaxWaitersError,
        ErrorKind::InvalidDocument,
        ErrorKind::DocumentTooLargeError,
    ];

    /// Direct parent in the hierarchy, `None` for roots.
    pub const fn parent(self) -> Option<ErrorKind> {
        use ErrorKind::*;

        match self {
            ClientError | ExceededMaxWaitersError | InvalidDocument => None,
            ConnectionFailure
            | ConfigurationError
            | OperationFailure
            | InvalidOperationError
            | InvalidNameError
            | CollectionInvalidError => Some(ClientError),
            AutoReconnect => Some(ConnectionFailure),
            NetworkTimeout | StalePrimaryError => Some(AutoReconnect),
            InvalidUriError => Some(ConfigurationError),
            CursorNotFoundError
            | ExecutionTimeoutError
            | WriteConcernError
            | WriteError
            | BulkWriteError => Some(OperationFailure),
            WriteTimeoutError => Some(WriteConcernError),
            DuplicateKeyError => Some(WriteError),
            DocumentTooLargeError => Some(InvalidDocument),
        }
    }

    /// The kind itself followed by each ancestor up to its root.
    pub fn ancestors(self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// Topmost ancestor of this kind.
    pub fn root(self) -> ErrorKind {
        let mut kind = self;
        while let Some(parent) = kind.parent() {
            kind = parent;
        }
        kind
    }

    /// True when `ancestor` is this kind or one of its ancestors.
    pub fn is_a(self, ancestor: ErrorKind) -> bool {
        self.ancestors().any(|kind| kind == ancestor)
    }

    /// Stable display name.
    pub const fn name(self) -> &'static str {
        use ErrorKind::*;

        match self {
            ClientError => "ClientError",
            ConnectionFailure => "ConnectionFailure",
            AutoReconnect => "AutoReconnect",
            NetworkTimeout => "NetworkTimeout",
            StalePrimaryError => "StalePrimaryError",
            ConfigurationError => "ConfigurationError",
            InvalidUriError => "InvalidURIError",
            OperationFailure => "OperationFailure",
            CursorNotFoundError => "CursorNotFoundError",
            ExecutionTimeoutError => "ExecutionTimeoutError",
            WriteConcernError => "WriteConcernError",
            WriteError => "WriteError",
            WriteTimeoutError => "WriteTimeoutError",
            DuplicateKeyError => "DuplicateKeyError",
            BulkWriteError => "BulkWriteError",
            InvalidOperationError => "InvalidOperationError",
            InvalidNameError => "InvalidNameError",
            CollectionInvalidError => "CollectionInvalidError",
            ExceededMaxWaitersError => "ExceededMaxWaitersError",
            InvalidDocument => "InvalidDocument",
            DocumentTooLargeError => "DocumentTooLargeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Iterator over a kind and its ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<ErrorKind>,
}

impl Iterator for Ancestors {
    type Item = ErrorKind;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
