//! Static retry and topology-refresh policy per error kind
//!
//! The command pipeline reads this table to decide whether to retry an
//! operation silently or ask the topology monitor for a refresh. Nothing here
//! retries or refreshes by itself.

use serde::Serialize;

use super::kind::ErrorKind;

/// Behavior the caller should apply to an error of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// The operation may be retried after reconnecting.
    pub retryable: bool,

    /// The client's view of the primary is stale and must be rediscovered.
    pub triggers_topology_refresh: bool,
}

impl Policy {
    const FAIL_FAST: Policy = Policy {
        retryable: false,
        triggers_topology_refresh: false,
    };
}

/// Policy for every kind, in [`ErrorKind::ALL`] order.
pub static POLICY_TABLE: [(ErrorKind, Policy); ErrorKind::ALL.len()] = build_table();

const fn build_table() -> [(ErrorKind, Policy); ErrorKind::ALL.len()] {
    let mut table = [(ErrorKind::ClientError, Policy::FAIL_FAST); ErrorKind::ALL.len()];
    let mut i = 0;
    while i < ErrorKind::ALL.len() {
        let kind = ErrorKind::ALL[i];
        table[i] = (kind, policy_for(kind));
        i += 1;
    }
    table
}

/// Look up the policy for `kind`.
///
/// `AutoReconnect` and its descendants are retryable; only
/// `StalePrimaryError` signals a topology refresh.
pub const fn policy_for(kind: ErrorKind) -> Policy {
    match kind {
        ErrorKind::StalePrimaryError => Policy {
            retryable: true,
            triggers_topology_refresh: true,
        },
        ErrorKind::AutoReconnect | ErrorKind::NetworkTimeout => Policy {
            retryable: true,
            triggers_topology_refresh: false,
        },
        _ => Policy::FAIL_FAST,
    }
}

impl ErrorKind {
    pub const fn policy(self) -> Policy {
        policy_for(self)
    }
}
