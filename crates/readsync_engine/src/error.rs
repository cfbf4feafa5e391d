//! Error types for the sync engine.

use readsync_protocol::ProtocolError;
use readsync_store::{AccountId, StoreError};
use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced to callers of the engine.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The service rejected the credentials. Do not retry without new ones.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Unexpected HTTP status, or a response that could not be understood.
    #[error("protocol error: {message}")]
    Protocol {
        /// HTTP status, when the failure was a status code.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The delivered device key cannot be decoded. The account has to be
    /// registered again.
    #[error("key format error: {0}")]
    KeyFormat(String),

    /// The request could not be signed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The account does not exist.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// The account has not completed registration.
    #[error("account {0} is not registered")]
    NotRegistered(AccountId),
}

impl SyncError {
    /// Creates a protocol error for an unexpected HTTP status.
    pub fn unexpected_status(status: u16, context: &str) -> Self {
        Self::Protocol {
            status: Some(status),
            message: format!("[{status}] {context}"),
        }
    }

    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns the HTTP status carried by a protocol error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Protocol { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Protocol { .. } => true,
            _ => false,
        }
    }

    /// Returns true if the account needs new credentials or a new
    /// registration before any retry can succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncError::Authentication(_) | SyncError::KeyFormat(_))
    }
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Authentication(message) => SyncError::Authentication(message),
            ProtocolError::KeyFormat(message) => SyncError::KeyFormat(message),
            ProtocolError::Signing(message) => SyncError::Signing(message),
            other @ (ProtocolError::ErrorResponse(_)
            | ProtocolError::Malformed(_)
            | ProtocolError::Encoding(_)) => SyncError::Protocol {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection reset").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::unexpected_status(500, "Sync Error").is_retryable());
        assert!(!SyncError::Authentication("bad password".into()).is_retryable());
        assert!(!SyncError::Signing("no key".into()).is_retryable());
    }

    #[test]
    fn terminal_errors() {
        assert!(SyncError::Authentication("bad password".into()).is_terminal());
        assert!(SyncError::KeyFormat("not DER".into()).is_terminal());
        assert!(!SyncError::Signing("no key".into()).is_terminal());
        assert!(!SyncError::unexpected_status(503, "Sync Error").is_terminal());
    }

    #[test]
    fn protocol_errors_map_to_taxonomy() {
        let err: SyncError = ProtocolError::Authentication("nope".into()).into();
        assert!(matches!(err, SyncError::Authentication(_)));

        let err: SyncError = ProtocolError::ErrorResponse("Unknown Error".into()).into();
        assert!(matches!(err, SyncError::Protocol { status: None, .. }));

        let err: SyncError = ProtocolError::KeyFormat("bad".into()).into();
        assert!(matches!(err, SyncError::KeyFormat(_)));
    }

    #[test]
    fn error_display() {
        let err = SyncError::unexpected_status(500, "Sync Error");
        assert_eq!(err.to_string(), "protocol error: [500] Sync Error");
        assert_eq!(err.status(), Some(500));

        let err = SyncError::NotRegistered(AccountId::new(3));
        assert_eq!(err.to_string(), "account 3 is not registered");
    }
}
