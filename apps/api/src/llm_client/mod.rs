/// Provider adapter: the single point of entry for all text-completion calls.
///
/// ARCHITECTURAL RULE: No other module talks to an LLM backend directly.
/// Task operations depend on the `TextProvider` trait; `LlmClient` is the
/// production implementation, built once in `main` and shared via `AppState`.
///
/// Backends:
/// - Gemini (managed default, server-held key, single non-streaming call)
/// - OpenRouter (alternate, user-supplied key, streamed chat completion)
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{AiConfig, ProviderKind};

pub mod gemini;
pub mod openrouter;
pub mod prompts;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("No API key available for {0}")]
    MissingApiKey(&'static str),

    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),
}

/// Uniform text-completion interface over both backends.
///
/// An empty string is a valid result meaning "no AI output"; transport and
/// auth failures are errors.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate_text(&self, prompt: &str, config: Option<&AiConfig>)
        -> Result<String, LlmError>;

    /// True iff the managed server credential exists.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Production provider. Holds one pooled HTTP client for both backends.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    managed_key: Option<String>,
    gemini_model: String,
    gemini_api_base: String,
    openrouter_api_base: String,
    openrouter_default_model: String,
    site_url: String,
    site_name: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(config.ai_timeout).build()?;
        Ok(Self {
            http,
            managed_key: config.google_api_key.clone(),
            gemini_model: config.gemini_model.clone(),
            gemini_api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            openrouter_api_base: config.openrouter_api_base.trim_end_matches('/').to_string(),
            openrouter_default_model: config.openrouter_default_model.clone(),
            site_url: config.openrouter_site_url.clone(),
            site_name: config.openrouter_site_name.clone(),
            timeout: config.ai_timeout,
        })
    }

    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    async fn generate_with_gemini(
        &self,
        prompt: &str,
        config: Option<&AiConfig>,
    ) -> Result<String, LlmError> {
        // A per-request key overrides the managed one for this call only.
        let key = config
            .and_then(AiConfig::api_key)
            .or(self.managed_key.as_deref())
            .ok_or(LlmError::MissingApiKey("gemini"))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.gemini_api_base, self.gemini_model
        );
        let body = gemini::GenerateContentRequest::user_prompt(prompt);

        let response = self
            .send_with_retry(|| {
                self.http
                    .post(&url)
                    .header("x-goog-api-key", key)
                    .json(&body)
            })
            .await?;

        let parsed: gemini::GenerateContentResponse = response.json().await?;
        Ok(parsed.text())
    }

    async fn generate_with_openrouter(
        &self,
        prompt: &str,
        config: &AiConfig,
    ) -> Result<String, LlmError> {
        let key = config
            .api_key()
            .ok_or(LlmError::MissingApiKey("openrouter"))?;
        let model = config.model().unwrap_or(&self.openrouter_default_model);
        let url = format!("{}/chat/completions", self.openrouter_api_base);
        let body = openrouter::ChatRequest::streamed_user_prompt(model, prompt);
        let referer = config.site_url().unwrap_or(&self.site_url);
        let title = config.site_name().unwrap_or(&self.site_name);

        let response = self
            .send_with_retry(|| {
                self.http
                    .post(&url)
                    .bearer_auth(key)
                    .header("HTTP-Referer", referer)
                    .header("X-Title", title)
                    .json(&body)
            })
            .await?;

        let raw = response.text().await?;
        openrouter::collect_stream(&raw)
    }

    /// Sends a request, retrying on 429 (rate limit) and 5xx errors with
    /// exponential backoff. Other non-success statuses fail immediately.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI backend returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Bounds a provider call; expiry surfaces as `LlmError::Timeout`.
pub async fn with_timeout<F>(limit: Duration, call: F) -> Result<String, LlmError>
where
    F: Future<Output = Result<String, LlmError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| LlmError::Timeout(limit))?
}

#[async_trait]
impl TextProvider for LlmClient {
    async fn generate_text(
        &self,
        prompt: &str,
        config: Option<&AiConfig>,
    ) -> Result<String, LlmError> {
        let text = match config {
            Some(cfg) if cfg.provider == ProviderKind::OpenRouter => {
                with_timeout(self.timeout, self.generate_with_openrouter(prompt, cfg)).await?
            }
            _ => with_timeout(self.timeout, self.generate_with_gemini(prompt, config)).await?,
        };

        debug!(
            "AI call succeeded: prompt_chars={}, response_chars={}",
            prompt.len(),
            text.len()
        );
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.managed_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base: &str, managed_key: Option<&str>, timeout: Duration) -> LlmClient {
        let config = Config {
            google_api_key: managed_key.map(String::from),
            gemini_api_base: base.to_string(),
            openrouter_api_base: base.to_string(),
            ai_timeout: timeout,
            ..Config::default()
        };
        LlmClient::new(&config).unwrap()
    }

    async fn gemini_echo(
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if key == "bad-key" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "API key not valid"}})),
            );
        }
        let prompt = body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"text": format!("{call}|{key}|")},
                        {"text": prompt}
                    ]}
                }]
            })),
        )
    }

    #[tokio::test]
    async fn test_gemini_uses_managed_key_and_model() {
        let base = serve(Router::new().route("/models/:call", post(gemini_echo))).await;
        let client = client_for(&base, Some("server-key"), Duration::from_secs(5));

        let text = client.generate_text("hello", None).await.unwrap();
        assert_eq!(
            text,
            "gemini-2.5-flash-lite:generateContent|server-key|hello"
        );
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_gemini_request_key_overrides_managed_key() {
        let base = serve(Router::new().route("/models/:call", post(gemini_echo))).await;
        let client = client_for(&base, None, Duration::from_secs(5));
        let config = AiConfig {
            api_key: Some("user-key".to_string()),
            ..Default::default()
        };

        let text = client.generate_text("hi", Some(&config)).await.unwrap();
        assert!(text.contains("|user-key|"));
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_gemini_auth_failure_is_an_error() {
        let base = serve(Router::new().route("/models/:call", post(gemini_echo))).await;
        let client = client_for(&base, Some("bad-key"), Duration::from_secs(5));

        match client.generate_text("hi", None).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_without_any_key_fails_fast() {
        let client = client_for("http://127.0.0.1:9", None, Duration::from_secs(5));
        assert!(matches!(
            client.generate_text("hi", None).await,
            Err(LlmError::MissingApiKey("gemini"))
        ));
    }

    #[tokio::test]
    async fn test_openrouter_concatenates_stream() {
        async fn stream(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
            assert_eq!(body["stream"], json!(true));
            assert_eq!(body["model"], json!("openai/gpt-3.5-turbo"));
            assert_eq!(
                headers.get("authorization").unwrap().to_str().unwrap(),
                "Bearer sk-or-1"
            );
            assert_eq!(headers.get("x-title").unwrap().to_str().unwrap(), "OptimumCV");
            (
                [("content-type", "text/event-stream")],
                ": OPENROUTER PROCESSING\n\n\
                 data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n\
                 data: {\"choices\":[{\"delta\":{\"content\":\", world\"}}]}\n\n\
                 data: {\"choices\":[{\"delta\":{}}],\"usage\":{\"total_tokens\":9}}\n\n\
                 data: [DONE]\n\n",
            )
        }

        let base = serve(Router::new().route("/chat/completions", post(stream))).await;
        let client = client_for(&base, None, Duration::from_secs(5));

        let text = client
            .generate_text("hi", Some(&AiConfig::openrouter("sk-or-1")))
            .await
            .unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn test_openrouter_requires_key() {
        let client = client_for("http://127.0.0.1:9", Some("server-key"), Duration::from_secs(5));
        let config = AiConfig {
            provider: ProviderKind::OpenRouter,
            ..Default::default()
        };
        assert!(matches!(
            client.generate_text("hi", Some(&config)).await,
            Err(LlmError::MissingApiKey("openrouter"))
        ));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        async fn slow() -> Json<Value> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"candidates": []}))
        }

        let base = serve(Router::new().route("/models/:call", post(slow))).await;
        let client = client_for(&base, Some("k"), Duration::from_millis(100));

        assert!(matches!(
            client.generate_text("hi", None).await,
            Err(LlmError::Timeout(_))
        ));
    }
}
