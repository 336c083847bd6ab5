use common::ContextError;
use models::errors::ModelError;
use thiserror::Error;

/// Failures surfaced by any `PlayerRepository` backend.
///
/// An absent record is not an error; lookups return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("username already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RepositoryError::Validation(_) => 2001,
            RepositoryError::Conflict => 2002,
            RepositoryError::Unavailable(_) => 2101,
            RepositoryError::Internal(_) => 2200,
        }
    }
}

impl From<ModelError> for RepositoryError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => RepositoryError::Validation(msg),
            ModelError::Conflict(_) => RepositoryError::Conflict,
            ModelError::Unavailable(msg) => RepositoryError::Unavailable(msg),
            ModelError::Db(msg) => RepositoryError::Internal(msg),
        }
    }
}

impl From<ContextError> for RepositoryError {
    fn from(e: ContextError) -> Self {
        RepositoryError::Unavailable(e.to_string())
    }
}
