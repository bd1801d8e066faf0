//! Reconciliation status vocabulary
//!
//! The service owns the vocabulary and may add values at any time, so the
//! status is an open enum: known values get their own variant and anything
//! else is kept verbatim in [`ReconciliationStatus::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RECONCILE_PENDING: &str = "reconcile_pending";
pub const RECONCILING: &str = "reconciling";
pub const READY: &str = "ready";
pub const ERROR: &str = "error";
pub const DELETE_PENDING: &str = "delete_pending";
pub const DELETING: &str = "deleting";
pub const DELETED: &str = "deleted";
pub const DELETE_ERROR: &str = "delete_error";

/// Status of one reconciliation attempt as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReconciliationStatus {
    ReconcilePending,
    Reconciling,
    Ready,
    Error,
    DeletePending,
    Deleting,
    Deleted,
    DeleteError,
    /// A value this client does not know about yet
    Other(String),
}

impl ReconciliationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ReconcilePending => RECONCILE_PENDING,
            Self::Reconciling => RECONCILING,
            Self::Ready => READY,
            Self::Error => ERROR,
            Self::DeletePending => DELETE_PENDING,
            Self::Deleting => DELETING,
            Self::Deleted => DELETED,
            Self::DeleteError => DELETE_ERROR,
            Self::Other(s) => s,
        }
    }

    /// Work is queued or running on the service side.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::ReconcilePending | Self::Reconciling | Self::DeletePending | Self::Deleting
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error | Self::DeleteError)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for ReconciliationStatus {
    fn from(s: &str) -> Self {
        match s {
            RECONCILE_PENDING => Self::ReconcilePending,
            RECONCILING => Self::Reconciling,
            READY => Self::Ready,
            ERROR => Self::Error,
            DELETE_PENDING => Self::DeletePending,
            DELETING => Self::Deleting,
            DELETED => Self::Deleted,
            DELETE_ERROR => Self::DeleteError,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ReconciliationStatus {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<ReconciliationStatus> for String {
    fn from(status: ReconciliationStatus) -> Self {
        match status {
            ReconciliationStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl PartialEq<str> for ReconciliationStatus {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ReconciliationStatus {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_parse() {
        assert_eq!(ReconciliationStatus::from("reconcile_pending"), ReconciliationStatus::ReconcilePending);
        assert_eq!(ReconciliationStatus::from("reconciling"), ReconciliationStatus::Reconciling);
        assert_eq!(ReconciliationStatus::from("ready"), ReconciliationStatus::Ready);
        assert_eq!(ReconciliationStatus::from("delete_error"), ReconciliationStatus::DeleteError);
    }

    #[test]
    fn test_unknown_value_is_preserved() {
        let status: ReconciliationStatus = serde_json::from_str(r#""reconcile_disabled""#).unwrap();
        assert_eq!(status, ReconciliationStatus::Other("reconcile_disabled".to_string()));
        assert!(!status.is_known());
        assert!(!status.is_in_progress());
        assert!(!status.is_failed());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""reconcile_disabled""#);
    }

    #[test]
    fn test_serialize_known_value() {
        let json = serde_json::to_string(&ReconciliationStatus::Reconciling).unwrap();
        assert_eq!(json, r#""reconciling""#);
    }

    #[test]
    fn test_classification() {
        assert!(ReconciliationStatus::ReconcilePending.is_in_progress());
        assert!(ReconciliationStatus::Reconciling.is_in_progress());
        assert!(!ReconciliationStatus::Ready.is_in_progress());
        assert!(!ReconciliationStatus::Ready.is_failed());
        assert!(ReconciliationStatus::Error.is_failed());
    }

    #[test]
    fn test_compare_with_str() {
        assert_eq!(ReconciliationStatus::Ready, "ready");
        assert_eq!(ReconciliationStatus::Other("x".into()).to_string(), "x");
    }
}
