//! Error taxonomy for the access control system.
//!
//! A unified error type using `thiserror`, mirroring the error-handling
//! design used across every adapter: each failure surface gets one variant,
//! `#[from]` is used where a wrapped error type exists, and `anyhow::Error`
//! remains available as an escape hatch for test and glue code.

use thiserror::Error;

/// Result type alias using `AcsError`.
pub type Result<T> = std::result::Result<T, AcsError>;

/// Main error type for access control operations.
#[derive(Error, Debug)]
pub enum AcsError {
    /// Input failed validation (malformed field, unknown verb, empty name,
    /// an attempted cycle in the group hierarchy).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness invariant was violated, or a mutation targeted a
    /// relationship that does not exist (e.g. removing a non-member).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced id does not exist in the tenant's graph.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store (rate-limit store or audit sink) is unavailable.
    /// Callers in the hot path should treat this as fail-open, not a hard
    /// failure; `AdminApi` mutations surface it directly.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The caller cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller-provided deadline elapsed before the operation completed.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    /// An invariant that should be impossible to violate was violated
    /// anyway (e.g. a `UriAccess` row with both `grant` and `deny` set).
    /// Surfaced to the caller and recorded as a `security-anomaly` audit
    /// event; never silently corrected.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Escape hatch for errors originating outside this taxonomy.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AcsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the evaluator/rate-limiter hot path should treat this error
    /// as recoverable via fail-open rather than surfacing it to the caller.
    pub fn is_fail_open(&self) -> bool {
        matches!(self, AcsError::StoreUnavailable(_))
    }

    /// Maps this error onto the HTTP status an embedding transport layer
    /// would use; the core itself performs no transport (see the external
    /// interfaces section of the design).
    pub fn http_status_hint(&self) -> u16 {
        match self {
            AcsError::Validation(_) => 400,
            AcsError::NotFound(_) => 404,
            AcsError::Conflict(_) => 409,
            AcsError::Cancelled | AcsError::DeadlineExceeded(_) => 499,
            AcsError::StoreUnavailable(_) => 503,
            AcsError::Internal(_) | AcsError::Json(_) | AcsError::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_unavailable_is_fail_open() {
        let err = AcsError::store_unavailable("redis timeout");
        assert!(err.is_fail_open());
        assert!(!AcsError::validation("bad input").is_fail_open());
    }

    #[test]
    fn http_status_hints_match_taxonomy() {
        assert_eq!(AcsError::validation("x").http_status_hint(), 400);
        assert_eq!(AcsError::not_found("x").http_status_hint(), 404);
        assert_eq!(AcsError::conflict("x").http_status_hint(), 409);
        assert_eq!(AcsError::store_unavailable("x").http_status_hint(), 503);
        assert_eq!(AcsError::internal("x").http_status_hint(), 500);
    }

    #[test]
    fn custom_constructors_format_message() {
        let err = AcsError::validation("empty name");
        assert_eq!(err.to_string(), "validation failed: empty name");
    }
}
