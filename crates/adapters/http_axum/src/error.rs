//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ventmon_domain::error::VentmonError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`VentmonError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(VentmonError);

impl From<VentmonError> for ApiError {
    fn from(err: VentmonError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            VentmonError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            VentmonError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            VentmonError::Calculation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            VentmonError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            VentmonError::Script(err) => {
                tracing::error!(error = %err, "script error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
