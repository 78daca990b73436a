pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::extract::handle_extract_text;
use crate::gateway::handlers::handle_ai;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/ai", post(handle_ai))
        .route(
            "/api/extract-text",
            post(handle_extract_text).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // AI output is per-request; nothing here may be cached
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::ai::testing::ScriptedProvider;
    use crate::config::Config;
    use crate::models::cv::default_cv;

    fn router(provider: ScriptedProvider) -> Router {
        build_router(AppState {
            provider: Arc::new(provider),
            config: Config::default(),
        })
    }

    async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Option<String>, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache, serde_json::from_slice(&bytes).unwrap())
    }

    async fn upload(app: Router, file_name: &str, content_type: &str, data: &[u8]) -> (StatusCode, Value) {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = app
            .oneshot(
                Request::post("/api/extract-text")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_ai_configuration() {
        let response = router(ScriptedProvider::unconfigured())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["aiConfigured"], false);
    }

    #[tokio::test]
    async fn test_unconfigured_returns_503_no_store() {
        let body = json!({
            "action": "enhance-summary",
            "payload": {"summary": "", "context": "Product Designer"}
        });
        let (status, cache, json) =
            post_json(router(ScriptedProvider::unconfigured()), "/api/ai", body.to_string()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(json, json!({"error": "AI service is not configured."}));
    }

    #[tokio::test]
    async fn test_adapt_cv_blank_job_is_400() {
        let body = json!({
            "action": "adapt-cv",
            "payload": {"cv": default_cv(), "jobDescription": "   "}
        });
        let (status, _, json) =
            post_json(router(ScriptedProvider::failing()), "/api/ai", body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            json!({"error": "CV data and job description are required."})
        );
    }

    #[tokio::test]
    async fn test_ats_provider_failure_uses_fallback() {
        let mut cv = default_cv();
        cv.experience[0].highlights = vec!["Built a dashboard.".to_string()];
        let body = json!({"action": "optimize-ats", "payload": {"cv": cv}});
        let (status, cache, json) =
            post_json(router(ScriptedProvider::failing()), "/api/ai", body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(json["fallback"], true);
        assert_eq!(
            json["cv"]["experience"][0]["highlights"][0],
            "Achieved Built a dashboard."
        );
    }

    #[tokio::test]
    async fn test_unknown_action_and_bad_body() {
        let body = json!({"action": "translate", "payload": {}});
        let (status, _, json) =
            post_json(router(ScriptedProvider::failing()), "/api/ai", body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Unsupported AI action.");

        let (status, _, json) =
            post_json(router(ScriptedProvider::failing()), "/api/ai", "{oops".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid AI request body.");
    }

    #[tokio::test]
    async fn test_import_without_json_is_422() {
        let body = json!({"action": "import-cv", "payload": {"text": "Jane Roe, engineer"}});
        let (status, _, json) =
            post_json(router(ScriptedProvider::texts(&["Sorry, no."])), "/api/ai", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "AI could not structure that resume yet.");
    }

    #[tokio::test]
    async fn test_extract_text_plain_upload() {
        let (status, json) = upload(
            router(ScriptedProvider::unconfigured()),
            "resume.txt",
            "text/plain",
            b"Jane Roe\nRust engineer",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["text"], "Jane Roe\nRust engineer");
        assert_eq!(json["mimeType"], "text/plain");
    }

    #[tokio::test]
    async fn test_extract_text_failures_are_422() {
        let (status, json) = upload(
            router(ScriptedProvider::unconfigured()),
            "archive.zip",
            "application/zip",
            b"PK\x03\x04",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("application/zip"));

        let (status, _) = upload(
            router(ScriptedProvider::unconfigured()),
            "broken.pdf",
            "application/pdf",
            b"%PDF-1.4 not really a pdf",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
