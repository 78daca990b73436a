// AI task operations.
//
// Each operation builds a prompt, calls the provider, recovers structure from
// the answer, and validates it. Operations with a local fallback never surface
// provider or parse failures: they return a `TaskOutcome` flagged `fallback`.

pub mod adapt;
pub mod ats;
pub mod enhance;
pub mod fallback;
pub mod import;
pub mod internship;
pub mod letter;
pub mod prompts;

use std::sync::Arc;

use thiserror::Error;

use crate::llm_client::{LlmError, TextProvider};
use crate::models::{AiConfig, ProviderKind, SchemaError};
use crate::recovery::{strip_code_fences, ExtractionError};

#[derive(Debug, Error)]
pub enum TaskError {
    /// Caller input is unusable. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("AI service is not configured.")]
    NotConfigured,

    #[error("AI provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("AI returned an empty response")]
    EmptyResponse,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("AI output failed validation: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to encode prompt input: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result of an operation that may have degraded to its local fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome<T> {
    pub value: T,
    pub fallback: bool,
    /// Set only when `fallback` is true.
    pub message: Option<String>,
}

impl<T> TaskOutcome<T> {
    pub fn ai(value: T) -> Self {
        Self {
            value,
            fallback: false,
            message: None,
        }
    }

    pub fn fallback(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            fallback: true,
            message: Some(message.into()),
        }
    }
}

/// Provider plus the per-request configuration forwarded with every call.
#[derive(Clone)]
pub struct AiContext {
    provider: Arc<dyn TextProvider>,
    config: Option<AiConfig>,
}

impl AiContext {
    pub fn new(provider: Arc<dyn TextProvider>, config: Option<AiConfig>) -> Self {
        Self { provider, config }
    }

    /// Ok when either the managed credential or the caller's own key can
    /// serve a request. An OpenRouter config without a key is rejected
    /// outright: it would never reach the managed backend.
    pub fn ensure_available(&self) -> Result<(), TaskError> {
        if let Some(config) = &self.config {
            if config.provider == ProviderKind::OpenRouter && !config.is_self_sufficient() {
                return Err(TaskError::Validation(
                    "An OpenRouter API key is required.".to_string(),
                ));
            }
            if config.is_self_sufficient() {
                return Ok(());
            }
        }
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(TaskError::NotConfigured)
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.provider.generate_text(prompt, self.config.as_ref()).await
    }

    /// `generate`, fence-stripped, treating a blank answer as a failure.
    pub async fn generate_non_empty(&self, prompt: &str) -> Result<String, TaskError> {
        let raw = self.generate(prompt).await?;
        let text = strip_code_fences(&raw);
        if text.is_empty() {
            return Err(TaskError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_availability_managed_or_own_key() {
        let (ai, _) = context(ScriptedProvider::failing());
        assert!(ai.ensure_available().is_ok());

        let bare = AiContext::new(Arc::new(ScriptedProvider::unconfigured()), None);
        assert!(matches!(
            bare.ensure_available(),
            Err(TaskError::NotConfigured)
        ));

        let own_key = AiContext::new(
            Arc::new(ScriptedProvider::unconfigured()),
            Some(AiConfig::openrouter("sk-or-test")),
        );
        assert!(own_key.ensure_available().is_ok());

        // a gemini config without a key simply uses the managed credential
        let managed = AiContext::new(
            Arc::new(ScriptedProvider::failing()),
            Some(AiConfig::default()),
        );
        assert!(managed.ensure_available().is_ok());
    }

    #[test]
    fn test_openrouter_without_key_is_rejected_even_when_managed_exists() {
        for provider in [ScriptedProvider::failing(), ScriptedProvider::unconfigured()] {
            let blank_key = AiContext::new(Arc::new(provider), Some(AiConfig::openrouter("  ")));
            assert!(matches!(
                blank_key.ensure_available(),
                Err(TaskError::Validation(m)) if m == "An OpenRouter API key is required."
            ));
        }
    }

    #[tokio::test]
    async fn test_generate_non_empty_strips_fences_and_rejects_blank() {
        let (ai, _) = context(ScriptedProvider::texts(&["```\nhello\n```", "  \n"]));
        assert_eq!(ai.generate_non_empty("p").await.unwrap(), "hello");
        assert!(matches!(
            ai.generate_non_empty("p").await,
            Err(TaskError::EmptyResponse)
        ));
        assert!(matches!(
            ai.generate_non_empty("p").await,
            Err(TaskError::Provider(_))
        ));
    }
}
