use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No credential file uploaded")]
    MissingFile,

    #[error("Empty file")]
    EmptyFile,

    #[error("Invalid multipart upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid JSON format in credentials file")]
    MalformedDocument,

    #[error("Invalid credentials file: missing {0}")]
    MissingField(&'static str),

    #[error("Project ID is required")]
    MissingProjectId,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::EmptyFile
            | AppError::InvalidUpload(_)
            | AppError::MalformedDocument
            | AppError::MissingField(_)
            | AppError::MissingProjectId => StatusCode::BAD_REQUEST,
            AppError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(e) => tracing::error!("Server error: {:#}", e),
            AppError::AuthenticationFailed(reason) => {
                tracing::warn!("Authentication error: {}", reason)
            }
            other => tracing::debug!("rejected request: {}", other),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_input_errors_are_bad_request() {
        for err in [
            AppError::MissingFile,
            AppError::EmptyFile,
            AppError::InvalidUpload("boundary".into()),
            AppError::MalformedDocument,
            AppError::MissingField("client_id"),
            AppError::MissingProjectId,
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{}", err);
        }
    }

    #[test]
    fn test_authentication_failure_is_unauthorized() {
        let err = AppError::AuthenticationFailed("invalid_grant".into());
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Authentication failed: invalid_grant");
    }

    #[test]
    fn test_missing_field_names_the_key() {
        let err = AppError::MissingField("private_key_id");
        assert_eq!(
            err.to_string(),
            "Invalid credentials file: missing private_key_id"
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let resp = AppError::Internal(anyhow::anyhow!("disk full")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Server error: disk full" }));
    }
}
