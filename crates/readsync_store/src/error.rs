//! Error types for store operations.

use crate::model::AccountId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account does not exist.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// A write was rejected because it would violate a record invariant.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// The underlying storage failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::AccountNotFound(AccountId::new(42));
        assert_eq!(err.to_string(), "account 42 not found");

        let err = StoreError::Backend("disk full".into());
        assert!(err.to_string().contains("disk full"));
    }
}
