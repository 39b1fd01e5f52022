use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use supportdesk_core::SupportError;
use thiserror::Error;
use tracing::error;

/// Errors returned to HTTP clients.
///
/// Internal failures are logged with their details and reported with a
/// generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("query exceeds {max} characters")]
    PayloadTooLarge { max: usize },

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal(#[source] SupportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SupportError> for ApiError {
    fn from(err: SupportError) -> Self {
        match err {
            SupportError::SessionNotFound(id) => ApiError::NotFound(id),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref source) = self {
            error!(error = %source, "Request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_maps_to_404() {
        let err: ApiError = SupportError::SessionNotFound("abc".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_failure_hides_details() {
        let err: ApiError = SupportError::Store("mongodb://user:pw@host refused".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn test_too_large_message() {
        let err = ApiError::PayloadTooLarge { max: 10 };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "query exceeds 10 characters");
    }
}
