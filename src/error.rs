//! Custom error types for ledgerkeep
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledgerkeep operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The platform cryptographic primitives are unavailable or misconfigured.
    /// Fatal for any encrypt/decrypt path; callers must not retry.
    #[error("Cryptographic provider unavailable: {0}")]
    CryptoUnavailable(String),

    /// The active identity does not match the stored encryption owner
    #[error("Wrong wallet: store is owned by {expected}, session is {actual}")]
    IdentityMismatch { expected: String, actual: String },

    /// Persisted bytes failed to decode under the mode the caller expected
    #[error("Corrupted {record} record: {reason}")]
    CorruptedStore {
        record: &'static str,
        reason: String,
    },

    /// A mode conversion wrote one record but not the other. Recoverable by
    /// re-running the conversion, never by silent continuation.
    #[error("Interrupted switch to {target} storage; run 'encrypt resume' to finish")]
    PartialModeSwitch { target: String },

    /// Encryption/decryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wallet session errors
    #[error("Session error: {0}")]
    Session(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl LedgerError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a corrupted-store error for a named record
    pub fn corrupted(record: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptedStore {
            record,
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error indicates an interrupted mode switch
    pub fn is_partial_switch(&self) -> bool {
        matches!(self, Self::PartialModeSwitch { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledgerkeep operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_identity_mismatch_display() {
        let err = LedgerError::IdentityMismatch {
            expected: "0xabc".into(),
            actual: "0xdef".into(),
        };
        assert_eq!(
            err.to_string(),
            "Wrong wallet: store is owned by 0xabc, session is 0xdef"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::transaction_not_found("tx-1");
        assert_eq!(err.to_string(), "Transaction not found: tx-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_partial_switch_check() {
        let err = LedgerError::PartialModeSwitch {
            target: "encrypted".into(),
        };
        assert!(err.is_partial_switch());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }
}
