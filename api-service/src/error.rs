use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::ServiceError;

/// HTTP face of [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        if self.0.is_retryable() {
            return (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable");
        }

        match &self.0 {
            ServiceError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self.0, code = code, "Request failed");
        } else {
            tracing::warn!(error = %self.0, code = code, "Request rejected");
        }

        let body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": self.0.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}
