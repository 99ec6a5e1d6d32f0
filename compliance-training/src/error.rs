//! Error taxonomy exposed by the progression engine.

use thiserror::Error;

use crate::storage;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

/// Errors surfaced to callers of [`TrainingEngine`](crate::TrainingEngine).
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Malformed or empty input. Nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced course, policy or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store failed; the in-flight operation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(#[source] storage::Error),
}

impl From<storage::Error> for TrainingError {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::Rejected(reason) => Self::Validation(reason),
            other => Self::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_submissions_become_validation_errors() {
        let err: TrainingError =
            storage::Error::Rejected("question 9 is not part of course 1".into()).into();
        assert!(matches!(err, TrainingError::Validation(_)));
        assert!(err.to_string().contains("question 9"));
    }

    #[test]
    fn invalid_rows_stay_persistence_errors() {
        let err: TrainingError = storage::Error::InvalidData("bad status".into()).into();
        assert!(matches!(err, TrainingError::Persistence(_)));
    }
}
