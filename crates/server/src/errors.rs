use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use thiserror::Error;

/// Body of the read listener's not-found reply (a bare JSON string).
pub const NOT_FOUND_MESSAGE: &str = "user_id not found";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body did not decode into a record; carries the decoder's message.
    #[error("{0}")]
    Decode(String),
    #[error("user_id not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Decode(msg) => ApiError::Decode(msg),
            ServiceError::NotFound(_) => ApiError::NotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Decode(msg) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                msg,
            )
                .into_response(),
            ApiError::NotFound => (StatusCode::BAD_REQUEST, Json(NOT_FOUND_MESSAGE)).into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "unauthorized"})),
            )
                .into_response(),
        }
    }
}
