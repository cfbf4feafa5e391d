//! Error types for protocol operations.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while building or interpreting protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The service did not recognise the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The service answered with its generic error document.
    #[error("service returned an error: {0}")]
    ErrorResponse(String),

    /// A response could not be parsed or lacks a required element.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A request could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The delivered key payload is not a usable key container.
    #[error("invalid key format: {0}")]
    KeyFormat(String),

    /// The request could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl ProtocolError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// Bad credentials and bad key material stay bad until the account is
    /// registered again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ErrorResponse(_) | Self::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ProtocolError::ErrorResponse("Unknown Error".into()).is_retryable());
        assert!(ProtocolError::malformed("truncated").is_retryable());
        assert!(!ProtocolError::Authentication("bad password".into()).is_retryable());
        assert!(!ProtocolError::KeyFormat("not DER".into()).is_retryable());
        assert!(!ProtocolError::Signing("no key".into()).is_retryable());
    }
}
