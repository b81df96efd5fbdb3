//! Error types surfaced to callers of the review core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// A referenced case (or other record) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation needs a learner identity and none was supplied.
    #[error("Authentication required")]
    Unauthenticated,

    /// Required input was missing or malformed.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;

impl ReviewError {
    /// Errors caused by the caller's input rather than by storage.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ReviewError::NotFound(_) | ReviewError::Unauthenticated | ReviewError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(ReviewError::NotFound("case x".into()).is_caller_error());
        assert!(ReviewError::Unauthenticated.is_caller_error());
        assert!(ReviewError::Validation("case_id is required".into()).is_caller_error());
        assert!(!ReviewError::Database(rusqlite::Error::QueryReturnedNoRows).is_caller_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ReviewError::NotFound("Case abc".into()).to_string(),
            "Not found: Case abc"
        );
        assert_eq!(ReviewError::Unauthenticated.to_string(), "Authentication required");
    }
}
