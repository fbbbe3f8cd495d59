//! Error types for InvoiceDB core.

use crate::model::InvoiceId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by every [`crate::Database`] implementation.
///
/// Storage and codec failures from the layers below are folded into
/// [`CoreError::StoreOperationFailure`], so callers see the same vocabulary
/// whichever backend is configured.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An argument was rejected before any I/O took place.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// No invoice with the given id exists.
    #[error("invoice not found: {id}")]
    InvoiceNotFound {
        /// The id that was looked up.
        id: InvoiceId,
    },

    /// The backing store failed.
    #[error("store operation failed: {message}")]
    StoreOperationFailure {
        /// Description of the failure.
        message: String,
        /// The underlying storage or codec error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Another process holds the store's lock file.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,

    /// Configuration could not be parsed.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the bad setting.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a store failure without an underlying cause.
    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreOperationFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for errors the caller caused by passing bad input.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns true if the error reports a missing invoice.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvoiceNotFound { .. })
    }
}

impl From<invoicedb_storage::StorageError> for CoreError {
    fn from(err: invoicedb_storage::StorageError) -> Self {
        Self::StoreOperationFailure {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<invoicedb_codec::CodecError> for CoreError {
    fn from(err: invoicedb_codec::CodecError) -> Self {
        Self::StoreOperationFailure {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::StoreOperationFailure {
            message: format!("I/O error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
