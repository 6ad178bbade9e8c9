use crate::api::ErrorBody;
use crate::error::{FieldErrors, StoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

pub type ServerResult<T> = Result<T, ServerError>;

/// Failures of the listing endpoint, rendered as `{"message", "errors"?}`
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid password")]
    Unauthorized,

    /// Body or query string could not be parsed
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{}", .0.summary())]
    Invalid(FieldErrors),

    #[error("Property not found")]
    NotFound,

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::NotFound | ServerError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ServerError::BadRequest(_) | ServerError::Invalid(_) | ServerError::Store(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.to_string());
        match self {
            ServerError::Invalid(errors) | ServerError::Store(StoreError::Invalid(errors)) => {
                body.with_errors(errors.clone())
            }
            _ => body,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!("Responding {}: {}", status, self);
        (status, Json(self.body())).into_response()
    }
}
