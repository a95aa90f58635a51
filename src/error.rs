use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite primary result codes for a locked database (SQLITE_BUSY, SQLITE_LOCKED)
/// plus the extended busy codes sqlx reports.
const SQLITE_BUSY_CODES: [&str; 4] = ["5", "6", "261", "517"];

/// Generic SQLITE_CONSTRAINT and SQLITE_CONSTRAINT_TRIGGER (a trigger's
/// RAISE(ABORT)); the specific constraint codes already have an `ErrorKind`.
const SQLITE_CONSTRAINT_CODES: [&str; 2] = ["19", "1811"];

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Storage failures abort the whole operation; everything else is per-row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => LedgerError::NotFound("row not found".into()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation => {
                    LedgerError::Conflict(db_err.message().to_string())
                }
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    LedgerError::Validation(db_err.message().to_string())
                }
                _ => match db_err.code() {
                    Some(code) if SQLITE_BUSY_CODES.contains(&code.as_ref()) => {
                        LedgerError::Conflict("concurrent write in progress, retry".into())
                    }
                    Some(code) if SQLITE_CONSTRAINT_CODES.contains(&code.as_ref()) => {
                        LedgerError::Conflict(db_err.message().to_string())
                    }
                    _ => LedgerError::Storage(err.to_string()),
                },
            },
            _ => LedgerError::Storage(err.to_string()),
        }
    }
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LedgerError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: LedgerError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn pool_failures_are_fatal_storage_errors() {
        let err: LedgerError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            LedgerError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(LedgerError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(LedgerError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            LedgerError::Storage("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
