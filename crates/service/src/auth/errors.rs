use thiserror::Error;

use crate::player::RepositoryError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("username already exists")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::Repository(e) => e.code(),
        }
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Validation(msg) => AuthError::Validation(msg),
            RepositoryError::Conflict => AuthError::Conflict,
            other => AuthError::Repository(other),
        }
    }
}
