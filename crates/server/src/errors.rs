use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Envelope;
use service::auth::AuthError;
use service::errors::ServiceError;
use service::player::RepositoryError;
use thiserror::Error;
use tracing::{error, warn};

/// Handler failure rendered as the unified `{code, message}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => {
                warn!(status = status.as_u16(), error = %other, "request rejected");
                other.to_string()
            }
        };
        (status, Json(Envelope::fail(status.as_u16(), message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Validation(msg) => ApiError::BadRequest(msg),
            RepositoryError::Conflict => ApiError::Conflict(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Conflict => ApiError::Conflict(e.to_string()),
            AuthError::Unauthorized => ApiError::Unauthorized(e.to_string()),
            AuthError::Repository(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}
