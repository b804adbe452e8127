//! Shared error types for the Ainon recorder.

use thiserror::Error;

/// Rejected input. Never retried; surfaced before any backend is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field was empty or whitespace-only.
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// The amount did not parse as a finite, non-negative decimal.
    #[error("amount '{0}' is not a finite, non-negative decimal")]
    InvalidAmount(String),
}

/// Failure reported by a persistence backend.
///
/// Backends classify their own failures: transient errors are worth retrying,
/// permanent ones are not. No driver-level error type crosses this boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Network/timeout-class failure; a later attempt may succeed.
    #[error("transient backend error: {0}")]
    Transient(String),

    /// The backend rejected the request outright; retrying cannot help.
    #[error("permanent backend error: {0}")]
    Permanent(String),
}

impl BackendError {
    /// Whether the retry policy should attempt this write again.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Transient(_))
    }
}

/// Top-level failure of a record call.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The action never became a record; neither backend was contacted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Both backends failed after retries; nothing durable can be assumed.
    #[error("dual write failed: memory: {memory}; knowledge: {knowledge}")]
    DualWriteFailure {
        /// Reason the memory side gave up.
        memory: String,
        /// Reason the knowledge side gave up.
        knowledge: String,
    },
}

/// Alias for Result with BackendError, used by the capability traits.
pub type BackendResult<T> = Result<T, BackendError>;
