//! Serializable view of a classified error
//!
//! Used by logging and by the `mongo-classify` tool to show what a caller
//! would see: the kind and its ancestors, the server diagnostics, and the
//! policy that applies.

use std::fmt;

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::failure::MongoError;
use super::kind::ErrorKind;

/// Structured information about one classified error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub ancestors: Vec<ErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_name: Option<&'static str>,
    pub retryable: bool,
    pub triggers_topology_refresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<JsonValue>>,
}

impl ErrorReport {
    pub fn from_error(error: &MongoError) -> Self {
        let kind = error.kind();
        let policy = error.policy();

        Self {
            kind,
            ancestors: kind.ancestors().skip(1).collect(),
            message: error.message().to_string(),
            code: error.code(),
            code_name: error.code().and_then(code_name),
            retryable: policy.retryable,
            triggers_topology_refresh: policy.triggers_topology_refresh,
            details: error.details().map(document_to_json),
            results: error
                .results()
                .map(|results| results.iter().map(document_to_json).collect()),
            errors: error
                .errors()
                .filter(|errors| !errors.is_empty())
                .map(|errors| errors.iter().cloned().map(Bson::into_relaxed_extjson).collect()),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Compact JSON on a single line.
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(code) = self.code {
            match self.code_name {
                Some(name) => write!(f, " [{code} {name}]")?,
                None => write!(f, " [{code}]")?,
            }
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        write!(
            f,
            " (retryable: {}, refresh: {})",
            self.retryable, self.triggers_topology_refresh
        )
    }
}

impl From<&MongoError> for ErrorReport {
    fn from(error: &MongoError) -> Self {
        Self::from_error(error)
    }
}

fn document_to_json(doc: &Document) -> JsonValue {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}

/// Human-readable name for a well-known server error code.
pub fn code_name(code: i32) -> Option<&'static str> {
    let name = match code {
        2 => "BadValue",
        13 => "Unauthorized",
        18 => "AuthenticationFailed",
        26 => "NamespaceNotFound",
        43 => "CursorNotFound",
        50 => "MaxTimeMSExpired",
        59 => "CommandNotFound",
        64 => "WriteConcernFailed",
        65 => "MultipleErrorsOccurred",
        91 => "ShutdownInProgress",
        100 => "UnsatisfiableWriteConcern",
        121 => "DocumentValidationFailure",
        189 => "PrimarySteppedDown",
        10107 => "NotWritablePrimary",
        11000 | 11001 | 12582 => "DuplicateKey",
        11600 => "InterruptedAtShutdown",
        11602 => "InterruptedDueToReplStateChange",
        13435 => "NotPrimaryNoSecondaryOk",
        13436 => "NotPrimaryOrSecondary",
        _ => return None,
    };

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::ServerFailure;
    use bson::doc;

    #[test]
    fn test_report_for_duplicate_key() {
        let details = doc! { "index": 0, "code": 11000, "keyValue": { "_id": 1 } };
        let err = MongoError::DuplicateKey(ServerFailure::new(
            "E11000 duplicate key",
            Some(11000),
            Some(details),
        ));
        let report = ErrorReport::from_error(&err);

        assert_eq!(report.kind, ErrorKind::DuplicateKeyError);
        assert_eq!(
            report.ancestors,
            vec![
                ErrorKind::WriteError,
                ErrorKind::OperationFailure,
                ErrorKind::ClientError
            ]
        );
        assert_eq!(report.code_name, Some("DuplicateKey"));
        assert!(!report.retryable);

        let json: JsonValue = serde_json::from_str(&report.to_json_compact().unwrap()).unwrap();
        assert_eq!(json["kind"], "DuplicateKeyError");
        assert_eq!(json["code"], 11000);
        assert_eq!(json["details"]["keyValue"]["_id"], 1);
        assert_eq!(json["triggersTopologyRefresh"], false);
        assert!(json.get("results").is_none());
    }

    #[test]
    fn test_report_for_stale_primary() {
        let err = MongoError::stale_primary("not master", Vec::new());
        let report = ErrorReport::from(&err);

        assert!(report.retryable);
        assert!(report.triggers_topology_refresh);
        assert!(report.code.is_none());
        assert!(report.errors.is_none());
        assert_eq!(
            report.to_string(),
            "StalePrimaryError: not master (retryable: true, refresh: true)"
        );
    }

    #[test]
    fn test_report_for_bulk_write() {
        let err = MongoError::bulk_write(vec![doc! { "ok": true }, doc! { "ok": false }]);
        let report = ErrorReport::from_error(&err);

        assert_eq!(report.code, Some(65));
        assert_eq!(report.results.as_ref().map(Vec::len), Some(2));
        assert!(report.to_string().starts_with("BulkWriteError [65 MultipleErrorsOccurred]"));
    }

    #[test]
    fn test_code_names() {
        assert_eq!(code_name(50), Some("MaxTimeMSExpired"));
        assert_eq!(code_name(11001), Some("DuplicateKey"));
        assert_eq!(code_name(424242), None);
    }
}
