//! Client errors

use thiserror::Error;

/// Errors returned by reconciler operations.
///
/// The client performs no local recovery: every failure is handed back to
/// the caller as one of these variants.
#[derive(Error, Debug)]
pub enum ReconcilerError {
    /// No response was obtained (connect, timeout, or body read failure).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered outside the 2xx range.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReconcilerError {
    /// HTTP status code when the service answered with a non-2xx status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ReconcilerError::UnexpectedStatus { status, .. } => Some(*status),
            ReconcilerError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ReconcilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_from_unexpected_status() {
        let err = ReconcilerError::UnexpectedStatus {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.status_code(), Some(503));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "unexpected status 503: unavailable");
    }

    #[test]
    fn test_not_found() {
        let err = ReconcilerError::UnexpectedStatus {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_has_no_status() {
        let err: ReconcilerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ReconcilerError::Decode(_)));
        assert_eq!(err.status_code(), None);
    }
}
