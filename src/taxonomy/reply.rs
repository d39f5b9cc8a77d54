//! Raw replies handed to the classifier
//!
//! The wire decoder and the transport produce these. A [`ServerReply`] is also
//! the builder pipelines use to attach context before a reply is classified.

use bson::{Bson, Document};
use serde::Serialize;

/// Where in a server response the error was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplySource {
    /// Top-level command or query failure.
    #[default]
    Command,
    /// One entry of a `writeErrors` array.
    Write,
    /// A `writeConcernError` sub-document, or a legacy getLastError result.
    WriteConcern,
    /// The outcome of a whole batch of writes.
    Batch,
}

/// No reply was received for the operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportFailure {
    pub message: String,
    /// The socket time budget ran out.
    pub timed_out: bool,
    pub causes: Vec<String>,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn timed_out(mut self) -> Self {
        self.timed_out = true;
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

/// Error reply received from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerReply {
    pub code: Option<i32>,
    /// Error category, e.g. `NotMaster`.
    pub code_name: Option<String>,
    pub labels: Vec<String>,
    pub message: String,
    pub details: Option<Document>,
    pub results: Option<Vec<Document>>,
    pub source: ReplySource,
    /// `CursorNotFound` bit of the legacy reply header.
    pub cursor_not_found: bool,
}

/// Input to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReply {
    Transport(TransportFailure),
    Server(ServerReply),
}

impl From<TransportFailure> for RawReply {
    fn from(failure: TransportFailure) -> Self {
        RawReply::Transport(failure)
    }
}

impl From<ServerReply> for RawReply {
    fn from(reply: ServerReply) -> Self {
        RawReply::Server(reply)
    }
}

impl ServerReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Reply describing a failed batch, one entry per attempted operation.
    pub fn batch(results: Vec<Document>) -> Self {
        Self {
            results: Some(results),
            source: ReplySource::Batch,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_code_name(mut self, code_name: impl Into<String>) -> Self {
        self.code_name = Some(code_name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_details(mut self, details: Document) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_results(mut self, results: Vec<Document>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_source(mut self, source: ReplySource) -> Self {
        self.source = source;
        self
    }

    pub fn with_cursor_not_found(mut self) -> Self {
        self.cursor_not_found = true;
        self
    }

    /// Build classifier input from a decoded reply document.
    ///
    /// The message comes from `errmsg`, `$err` or `err`. When the reply came
    /// through mongos and carries a `raw` per-shard map, the first failing
    /// shard supplies the message and code. Write commands report failures
    /// inside an otherwise successful reply: when the top level carries
    /// neither field, the last `writeErrors` entry supplies them and marks the
    /// reply as a write error, and failing that a `writeConcernError` marks it
    /// as a write-concern failure. A `results` array of documents is kept as the per-item
    /// outcomes. `details` is always the whole document.
    pub fn from_document(doc: &Document) -> Self {
        let mut reply = ServerReply {
            details: Some(doc.clone()),
            labels: string_array(doc, "errorLabels"),
            results: document_array(doc, "results"),
            ..Self::default()
        };

        let source = failing_shard(doc).unwrap_or(doc);
        reply.message = error_message(source).unwrap_or_default();
        reply.code = numeric_code(source);
        reply.code_name = source.get_str("codeName").ok().map(str::to_string);

        if reply.message.is_empty() && reply.code.is_none() {
            if let Some(write_error) = last_write_error(doc) {
                reply.take_error_fields(write_error, ReplySource::Write);
            } else if let Ok(wc_error) = doc.get_document("writeConcernError") {
                reply.take_error_fields(wc_error, ReplySource::WriteConcern);
            }
        }

        reply
    }

    fn take_error_fields(&mut self, error: &Document, source: ReplySource) {
        self.source = source;
        self.message = error_message(error).unwrap_or_default();
        self.code = numeric_code(error);
        self.code_name = error.get_str("codeName").ok().map(str::to_string);
    }
}

/// Last entry of a non-empty `writeErrors` array.
fn last_write_error(doc: &Document) -> Option<&Document> {
    doc.get_array("writeErrors").ok()?.last()?.as_document()
}

/// First shard in a mongos `raw` map that reports an error.
fn failing_shard(doc: &Document) -> Option<&Document> {
    let raw = doc.get_document("raw").ok()?;
    raw.values().find_map(|value| match value {
        Bson::Document(shard) if error_message(shard).is_some() && !is_ok(shard) => Some(shard),
        _ => None,
    })
}

fn error_message(doc: &Document) -> Option<String> {
    ["errmsg", "$err", "err"]
        .iter()
        .find_map(|key| doc.get_str(key).ok())
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Read `code`, accepting any numeric BSON type.
fn numeric_code(doc: &Document) -> Option<i32> {
    match doc.get("code")? {
        Bson::Int32(code) => Some(*code),
        Bson::Int64(code) => i32::try_from(*code).ok(),
        Bson::Double(code)
            if code.fract() == 0.0
                && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(code) =>
        {
            Some(*code as i32)
        }
        _ => None,
    }
}

/// `ok` as the server sends it: a number or a boolean.
fn is_ok(doc: &Document) -> bool {
    match doc.get("ok") {
        Some(Bson::Boolean(ok)) => *ok,
        Some(Bson::Int32(ok)) => *ok != 0,
        Some(Bson::Int64(ok)) => *ok != 0,
        Some(Bson::Double(ok)) => *ok != 0.0,
        _ => false,
    }
}

/// Absent unless every member is a document.
fn document_array(doc: &Document, key: &str) -> Option<Vec<Document>> {
    doc.get_array(key)
        .ok()?
        .iter()
        .map(|value| value.as_document().cloned())
        .collect()
}

fn string_array(doc: &Document, key: &str) -> Vec<String> {
    doc.get_array(key)
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
