use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Failure taxonomy surfaced by the identity service.
///
/// Every variant maps to exactly one HTTP status at the transport
/// boundary. `Storage` keeps its cause for logging but never echoes
/// driver details to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Not found.")]
    NotFound,
    #[error("{0}")]
    Auth(String),
    #[error("Storage operation failed.")]
    Storage(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn storage<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Storage(err.into())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(cause) => {
                error!(error = %cause, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
