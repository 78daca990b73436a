use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::TaskError;
use crate::recovery::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// A task could not produce usable output and has no fallback.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("AI service is not configured.")]
    NotConfigured,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ProcessingFailed(msg) => {
                tracing::warn!("Processing failed: {msg}");
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI request failed.".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl AppError {
    /// Maps a task failure with no fallback onto a response. `failure` is the
    /// user-facing message for the 422 case; the underlying cause is logged.
    pub fn from_task(err: TaskError, failure: &str) -> Self {
        match err {
            TaskError::Validation(msg) => AppError::Validation(msg),
            TaskError::NotConfigured => AppError::NotConfigured,
            TaskError::Encoding(e) => AppError::Internal(e.into()),
            other => {
                tracing::warn!(error = %other, "task failed without fallback");
                AppError::ProcessingFailed(failure.to_string())
            }
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::ProcessingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchemaError;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes_and_body_shape() {
        let (status, body) = body_of(AppError::Validation("Summary is required.".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Summary is required."}));

        let (status, body) = body_of(AppError::NotConfigured).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "AI service is not configured.");

        let (status, body) = body_of(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "AI request failed.");
    }

    #[test]
    fn test_from_task_mapping() {
        assert!(matches!(
            AppError::from_task(TaskError::Validation("bad".into()), "x"),
            AppError::Validation(m) if m == "bad"
        ));
        assert!(matches!(
            AppError::from_task(TaskError::NotConfigured, "x"),
            AppError::NotConfigured
        ));
        assert!(matches!(
            AppError::from_task(SchemaError::new("a", "b").into(), "Could not parse."),
            AppError::ProcessingFailed(m) if m == "Could not parse."
        ));
        assert!(matches!(
            AppError::from_task(TaskError::EmptyResponse, "Empty."),
            AppError::ProcessingFailed(_)
        ));
    }
}
