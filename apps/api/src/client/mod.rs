//! Client-side helpers: the gateway request helper, the local AI settings
//! store, and merge helpers for applying results to form state.

pub mod merge;
pub mod store;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::gateway::AiAction;
use crate::models::AiConfig;

/// Outcome of one gateway call. `fallback` means the caller should now run
/// its own local fallback; it is unrelated to the server-side `fallback` flag
/// carried inside `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct AiResult<T> {
    pub data: Option<T>,
    pub fallback: bool,
    pub error: Option<String>,
}

impl<T> AiResult<T> {
    fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            fallback: false,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            fallback: true,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize)]
struct OutgoingRequest<'a> {
    action: &'a str,
    payload: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a AiConfig>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    endpoint: String,
    config: Option<AiConfig>,
}

impl GatewayClient {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            endpoint: format!("{}/api/ai", base_url.trim_end_matches('/')),
            config: None,
        })
    }

    /// Forwards the user's own provider settings with every call.
    pub fn with_config(mut self, config: Option<AiConfig>) -> Self {
        self.config = config;
        self
    }

    /// Never fails: transport errors, non-200 statuses, and undecodable
    /// bodies all come back as `fallback = true` with a readable message.
    pub async fn request_ai<T: DeserializeOwned>(
        &self,
        action: AiAction,
        payload: Value,
    ) -> AiResult<T> {
        let body = OutgoingRequest {
            action: action.as_str(),
            payload: &payload,
            config: self.config.as_ref(),
        };

        let response = match self.http.post(&self.endpoint).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%action, error = %e, "AI request did not reach the gateway");
                return AiResult::failed(format!("AI request failed: {e}"));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return AiResult::failed(format!("AI request failed: {e}")),
        };

        if status != StatusCode::OK {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("AI request failed ({})", status.as_u16()));
            warn!(%action, status = status.as_u16(), "AI request rejected");
            return AiResult::failed(message);
        }

        match serde_json::from_str(&text) {
            Ok(data) => AiResult::ok(data),
            Err(e) => {
                warn!(%action, error = %e, "AI response did not match the expected shape");
                AiResult::failed("AI returned an unexpected response.")
            }
        }
    }
}
