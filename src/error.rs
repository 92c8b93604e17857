//! Unified error type for the docsign crate.
//!
//! Errors fall into the taxonomy the signing workflow surfaces to a caller:
//!
//! 1. **Validation** - a required field is missing before an action. The
//!    action is aborted and nothing is mutated.
//! 2. **Not found** - the requested identifier is absent from the store.
//!    Store lookups return `Option`; this variant only appears at the
//!    service and CLI boundary.
//! 3. **Simulated failure** - the artificial failure path of an upload or
//!    signing action. State is left untouched and the action can be retried.
//!
//! Storage, configuration and lifecycle errors round out the set. Every
//! message is meant to be shown to a user as-is.

use std::error::Error;
use std::fmt;

/// Unified error type for all docsign operations.
#[derive(Debug)]
pub enum DocsignError {
    /// Input validation error: a required field is missing or malformed.
    ValidationError(String),

    /// Configuration loading or parsing error.
    ConfigError(String),

    /// Key-value storage backend error.
    StorageError(String),

    /// IO error wrapper.
    IoError(std::io::Error),

    /// No document with the given identifier exists.
    DocumentNotFound { id: String },

    /// No documents were issued under the given recipient identifier.
    RecipientNotFound { recipient_id: String },

    /// A persisted record could not be decoded or violates the record invariants.
    DocumentMalformed { field: String, reason: String },

    /// The requested status change is not allowed from the current status.
    InvalidTransition { id: String, from: String, to: String },

    /// An artificial failure injected into an upload or signing action.
    SimulatedFailure { operation: String },

    /// The operation was cancelled before it completed.
    Cancelled { operation: String },

    /// The demo login was rejected.
    InvalidCredentials,

    /// No demo user is logged in.
    Unauthenticated,

    /// The logged-in demo user is not an administrator.
    Forbidden { email: String },
}

impl fmt::Display for DocsignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocsignError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            DocsignError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DocsignError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            DocsignError::IoError(err) => write!(f, "IO error: {}", err),
            DocsignError::DocumentNotFound { id } => {
                write!(
                    f,
                    "Document '{}' not found. Run `docsign document list` to see known documents.",
                    id
                )
            }
            DocsignError::RecipientNotFound { recipient_id } => {
                write!(
                    f,
                    "No documents found for link '{}'. The document link has expired or is invalid.",
                    recipient_id
                )
            }
            DocsignError::DocumentMalformed { field, reason } => {
                write!(f, "Malformed document: field '{}' - {}", field, reason)
            }
            DocsignError::InvalidTransition { id, from, to } => {
                write!(
                    f,
                    "Document '{}' cannot move from '{}' to '{}'.",
                    id, from, to
                )
            }
            DocsignError::SimulatedFailure { operation } => {
                write!(
                    f,
                    "Simulated {} failure. Nothing was changed; try the action again.",
                    operation
                )
            }
            DocsignError::Cancelled { operation } => {
                write!(f, "The {} operation was cancelled before it completed.", operation)
            }
            DocsignError::InvalidCredentials => write!(f, "Invalid credentials"),
            DocsignError::Unauthenticated => {
                write!(f, "Not logged in. Run `docsign login <email>` first.")
            }
            DocsignError::Forbidden { email } => {
                write!(
                    f,
                    "User '{}' does not have administrator access to this operation.",
                    email
                )
            }
        }
    }
}

impl Error for DocsignError {}

impl DocsignError {
    /// Whether retrying the same action may succeed without changing the input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocsignError::SimulatedFailure { .. }
                | DocsignError::Cancelled { .. }
                | DocsignError::StorageError(_)
                | DocsignError::IoError(_)
        )
    }
}

impl From<std::io::Error> for DocsignError {
    fn from(err: std::io::Error) -> Self {
        DocsignError::IoError(err)
    }
}

impl From<serde_json::Error> for DocsignError {
    fn from(err: serde_json::Error) -> Self {
        DocsignError::DocumentMalformed {
            field: "json".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<object_store::Error> for DocsignError {
    fn from(err: object_store::Error) -> Self {
        DocsignError::StorageError(err.to_string())
    }
}

impl From<object_store::path::Error> for DocsignError {
    fn from(err: object_store::path::Error) -> Self {
        DocsignError::StorageError(err.to_string())
    }
}

impl From<String> for DocsignError {
    fn from(err: String) -> Self {
        DocsignError::ValidationError(err)
    }
}

impl From<&str> for DocsignError {
    fn from(err: &str) -> Self {
        DocsignError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = DocsignError::ValidationError("recipient name is required".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Validation error"));
        assert!(msg.contains("recipient name"));
    }

    #[test]
    fn test_not_found_is_actionable() {
        let err = DocsignError::DocumentNotFound {
            id: "1700000000000".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1700000000000"));
        assert!(msg.contains("document list"));
    }

    #[test]
    fn test_recipient_not_found_mentions_link() {
        let err = DocsignError::RecipientNotFound {
            recipient_id: "5678".to_string(),
        };
        assert!(err.to_string().contains("expired or is invalid"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = DocsignError::InvalidTransition {
            id: "3".to_string(),
            from: "signed".to_string(),
            to: "signed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'3'"));
        assert!(msg.contains("from 'signed'"));
    }

    #[test]
    fn test_simulated_failure_is_retryable() {
        let err = DocsignError::SimulatedFailure {
            operation: "signing".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("try the action again"));
        assert!(!DocsignError::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_io_error_from_std_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: DocsignError = io_err.into();
        assert!(matches!(err, DocsignError::IoError(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_serde_error_maps_to_malformed() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DocsignError = parse_err.into();
        assert!(matches!(err, DocsignError::DocumentMalformed { .. }));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocsignError>();
    }
}
