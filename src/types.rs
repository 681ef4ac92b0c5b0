//! Error types shared across the service

use hyper::StatusCode;

/// Service-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AnnuaireError {
    /// Database connection string or name missing, or database unreachable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected storage-layer failure
    #[error("Database error: {0}")]
    Database(String),

    /// Unique index violation (Mongo error code 11000)
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Path segment did not parse as a BSON ObjectId
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Document does not exist (or was soft-deleted)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required field missing or constraint violated, checked before any write
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnnuaireError {
    /// Short machine-readable code carried in the envelope `error` field
    pub fn code(&self) -> &'static str {
        match self {
            AnnuaireError::Config(_) => "DB_UNAVAILABLE",
            AnnuaireError::Database(_) => "DB_ERROR",
            AnnuaireError::Duplicate(_) => "DUPLICATE",
            AnnuaireError::InvalidId(_) => "INVALID_ID",
            AnnuaireError::NotFound(_) => "NOT_FOUND",
            AnnuaireError::Validation(_) => "VALIDATION",
            AnnuaireError::Io(_) => "DB_ERROR",
        }
    }

    /// HTTP status for the envelope response.
    ///
    /// Malformed ids, missing documents, duplicates and validation failures
    /// are application outcomes, not transport errors: they answer 200 with
    /// `success:false`. Only infrastructure failures use error statuses.
    pub fn status(&self) -> StatusCode {
        match self {
            AnnuaireError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            AnnuaireError::Database(_) | AnnuaireError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Storage-layer detail stays in the logs; the caller gets a generic
    /// message for those variants.
    pub fn public_message(&self) -> String {
        match self {
            AnnuaireError::Database(_) | AnnuaireError::Io(_) => "Database error".to_string(),
            AnnuaireError::Config(_) => "Database not available".to_string(),
            other => other.to_string(),
        }
    }
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, AnnuaireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_outcomes_answer_200() {
        assert_eq!(
            AnnuaireError::InvalidId("x".into()).status(),
            StatusCode::OK
        );
        assert_eq!(
            AnnuaireError::NotFound("x".into()).status(),
            StatusCode::OK
        );
        assert_eq!(
            AnnuaireError::Validation("x".into()).status(),
            StatusCode::OK
        );
        assert_eq!(
            AnnuaireError::Duplicate("x".into()).status(),
            StatusCode::OK
        );
    }

    #[test]
    fn test_infrastructure_failures_use_error_statuses() {
        assert_eq!(
            AnnuaireError::Config("no uri".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AnnuaireError::Database("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_detail_not_leaked() {
        let err = AnnuaireError::Database("E11000 index users.email dup".into());
        assert_eq!(err.public_message(), "Database error");
        assert_eq!(err.code(), "DB_ERROR");
    }
}
