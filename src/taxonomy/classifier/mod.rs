//! Classification of raw replies into error kinds
//!
//! Rules are checked in a fixed order and the first match wins, so more
//! specific rules always come before the generic `OperationFailure` fallback.
//! The order matters because a code alone is not enough: code 65 names a bulk
//! failure only together with the shape of the reply.
//!
//! Classification is pure. It performs no I/O and touches no shared mutable
//! state, so one [`Classifier`] can be used from any number of threads.

use std::sync::LazyLock;

use bson::{Bson, Document};
use tracing::debug;

use super::failure::{BULK_WRITE_ERROR_CODE, BulkWriteFailure, MongoError, ServerFailure};
use super::reply::{RawReply, ReplySource, ServerReply, TransportFailure};


/// Duplicate key, including the mongos-wrapped insert variant.
pub const DUPLICATE_KEY_CODES: [i32; 3] = [11000, 11001, 12582];

/// `CursorNotFound`.
pub const CURSOR_NOT_FOUND_CODE: i32 = 43;

/// `MaxTimeMSExpired`.
pub const EXECUTION_TIMEOUT_CODE: i32 = 50;

/// `WriteConcernFailed` and `UnsatisfiableWriteConcern`.
pub const WRITE_CONCERN_CODES: [i32; 2] = [64, 100];

/// Signals that the node the client treats as primary no longer is one.
///
/// The wording the server uses changes across versions, so the whole pattern
/// set is replaceable through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePrimaryPatterns {
    /// Error categories (`codeName`) and labels, compared exactly.
    pub categories: Vec<String>,
    pub codes: Vec<i32>,
    /// Message prefixes, compared case-insensitively.
    pub messages: Vec<String>,
}

impl Default for StalePrimaryPatterns {
    fn default() -> Self {
        Self {
            categories: [
                "NotMaster",
                "NotMasterNoSlaveOk",
                "NotMasterOrSecondary",
                "NodeRecovering",
                "NotWritablePrimary",
                "NotPrimaryNoSecondaryOk",
                "NotPrimaryOrSecondary",
                "PrimarySteppedDown",
                "InterruptedDueToReplStateChange",
                "InterruptedAtShutdown",
                "ShutdownInProgress",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            codes: vec![10107, 13435, 13436, 11600, 11602, 189, 91],
            messages: ["not master", "node is recovering", "not primary"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl StalePrimaryPatterns {
    pub fn matches(&self, reply: &ServerReply) -> bool {
        let category_match = reply
            .code_name
            .iter()
            .chain(reply.labels.iter())
            .any(|category| self.categories.iter().any(|c| c == category));

        let code_match = reply.code.is_some_and(|code| self.codes.contains(&code));

        let message = reply.message.to_lowercase();
        let message_match = self
            .messages
            .iter()
            .any(|prefix| message.starts_with(&prefix.to_lowercase()));

        category_match || code_match || message_match
    }
}

/// Maps raw replies to the single most specific [`MongoError`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    stale_primary: StalePrimaryPatterns,
}

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Classify `reply` with the default stale-primary patterns.
pub fn classify(reply: &RawReply) -> MongoError {
    DEFAULT_CLASSIFIER.classify(reply)
}

impl Classifier {
    pub fn new(stale_primary: StalePrimaryPatterns) -> Self {
        Self { stale_primary }
    }

    pub fn stale_primary_patterns(&self) -> &StalePrimaryPatterns {
        &self.stale_primary
    }

    pub fn classify(&self, reply: &RawReply) -> MongoError {
        let error = match reply {
            RawReply::Transport(failure) => classify_transport(failure),
            RawReply::Server(reply) => self.classify_server(reply),
        };
        debug!(
            "Classified reply as {} (code: {:?})",
            error.kind(),
            error.code()
        );
        error
    }

    /// Classify a decoded reply document; see [`ServerReply::from_document`].
    pub fn classify_document(&self, doc: &Document) -> MongoError {
        self.classify(&RawReply::Server(ServerReply::from_document(doc)))
    }

    fn classify_server(&self, reply: &ServerReply) -> MongoError {
        if self.stale_primary.matches(reply) {
            let errors = reply
                .details
                .clone()
                .map(Bson::Document)
                .into_iter()
                .collect();
            return MongoError::stale_primary(reply.message.clone(), errors);
        }

        if reply.code == Some(BULK_WRITE_ERROR_CODE) || reply.source == ReplySource::Batch {
            return MongoError::BulkWrite(bulk_failure(reply));
        }

        let failure = || {
            ServerFailure::new(reply.message.clone(), reply.code, reply.details.clone())
        };

        if reply
            .code
            .is_some_and(|code| DUPLICATE_KEY_CODES.contains(&code))
        {
            return MongoError::DuplicateKey(failure());
        }

        if replication_timed_out(reply) {
            return MongoError::WriteTimeout(failure());
        }

        if is_write_concern_failure(reply) {
            return MongoError::WriteConcern(failure());
        }

        if reply.source == ReplySource::Write {
            return MongoError::Write(failure());
        }

        if reply.cursor_not_found || reply.code == Some(CURSOR_NOT_FOUND_CODE) {
            return MongoError::CursorNotFound(failure());
        }

        if reply.code == Some(EXECUTION_TIMEOUT_CODE) {
            return MongoError::ExecutionTimeout(failure());
        }

        MongoError::OperationFailure(failure())
    }
}

fn classify_transport(failure: &TransportFailure) -> MongoError {
    let errors = failure
        .causes
        .iter()
        .cloned()
        .map(Bson::String)
        .collect();

    if failure.timed_out {
        MongoError::network_timeout(failure.message.clone(), errors)
    } else {
        MongoError::auto_reconnect(failure.message.clone(), errors)
    }
}

fn bulk_failure(reply: &ServerReply) -> BulkWriteFailure {
    let mut failure = BulkWriteFailure::new(reply.results.clone().unwrap_or_default());
    if !reply.message.is_empty() {
        failure = failure.with_message(reply.message.clone());
    }
    match reply.details.clone() {
        Some(details) => failure.with_details(details),
        None => failure,
    }
}

/// `wtimeout: true` at the top level (getLastError) or under `errInfo`.
fn replication_timed_out(reply: &ServerReply) -> bool {
    let Some(details) = reply.details.as_ref() else {
        return false;
    };

    let flag = |doc: &Document| doc.get_bool("wtimeout").unwrap_or(false);

    flag(details)
        || details.get_document("errInfo").is_ok_and(flag)
        || nested_write_concern_error(reply)
            .and_then(|wc| wc.get_document("errInfo").ok())
            .is_some_and(flag)
}

fn is_write_concern_failure(reply: &ServerReply) -> bool {
    reply.source == ReplySource::WriteConcern
        || reply
            .code
            .is_some_and(|code| WRITE_CONCERN_CODES.contains(&code))
        || nested_write_concern_error(reply).is_some()
}

/// A `writeErrors` entry outranks a `writeConcernError` in the same reply.
fn nested_write_concern_error(reply: &ServerReply) -> Option<&Document> {
    if reply.source == ReplySource::Write {
        return None;
    }
    reply.details.as_ref()?.get_document("writeConcernError").ok()
}
