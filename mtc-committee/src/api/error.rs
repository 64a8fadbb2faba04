//! Error-to-HTTP mapping shared by all handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mtc_common::Error;
use serde_json::json;
use tracing::error;

/// Handler result: JSON payload or a mapped workflow error
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Wraps the workflow error taxonomy for axum responses
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Reference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
