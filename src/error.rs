//! Error types for the vouch ledger
//!
//! Two layers: `StoreError` classifies faults at the persistence boundary,
//! `LedgerError` is the outcome vocabulary every operation speaks to callers.
//! Expected rejections (validation, forbidden, conflict) carry their
//! user-facing message verbatim; transient store faults surface generically
//! with the detail logged where the fault was observed.

use axum::http::StatusCode;
use thiserror::Error;
use tracing::error;

/// Faults observed at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A declared uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    UniqueViolation,

    /// The call exceeded the interactive deadline.
    #[error("store call exceeded the interactive deadline")]
    Timeout,

    /// Anything else the driver reported.
    #[error("store fault: {0}")]
    Backend(sqlx::Error),
}

impl StoreError {
    /// Classify a driver error, separating uniqueness violations so callers
    /// can turn them into conflicts instead of generic failures.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
        }
        StoreError::Backend(err)
    }
}

/// Outcome kinds for every ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request itself is invalid (self-vouch, blacklist conflict,
    /// reason length, bad field value). Message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// Soft-delete precondition failed. Intentionally conflates "never
    /// existed" with "already removed" so existence of removed records
    /// cannot be probed.
    #[error("vouch not found or already removed")]
    NotFoundOrAlreadyRemoved,

    /// The actor lacks the privilege or eligibility the operation requires.
    #[error("{0}")]
    Forbidden(String),

    /// A uniqueness rule rejected the write (duplicate blacklist entry).
    #[error("{0}")]
    Conflict(String),

    /// The store misbehaved. Surfaced generically; not retried here.
    #[error("temporary storage failure, please try again")]
    TransientStore,
}

impl LedgerError {
    pub fn status(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFoundOrAlreadyRemoved => StatusCode::NOT_FOUND,
            LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::TransientStore => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Rejection tuple for the HTTP handlers.
    pub fn reject(self) -> (StatusCode, String) {
        (self.status(), self.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => {
                LedgerError::Conflict("a matching entry already exists".to_string())
            }
            StoreError::Timeout => {
                error!("store call timed out");
                LedgerError::TransientStore
            }
            StoreError::Backend(e) => {
                error!(error = %e, "store fault");
                LedgerError::TransientStore
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            LedgerError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::NotFoundOrAlreadyRemoved.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LedgerError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(LedgerError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            LedgerError::TransientStore.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_transient_message_is_generic() {
        let msg = LedgerError::TransientStore.to_string();
        assert!(!msg.contains("sqlx"));
        assert!(!msg.contains("postgres"));
    }
}
