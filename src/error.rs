use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio_postgres::Error> for MockError {
    fn from(err: tokio_postgres::Error) -> Self {
        MockError::Lookup(err.to_string())
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match self {
            MockError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MockError::Lookup(_) => StatusCode::BAD_GATEWAY,
            MockError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            MockError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MockError>;
