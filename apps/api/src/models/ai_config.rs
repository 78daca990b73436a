use serde::{Deserialize, Serialize};

/// Which text-completion backend a request should use.
///
/// `Gemini` is the managed default held by the server; `OpenRouter` is the
/// alternate backend reached with the user's own key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
}

/// Per-request provider configuration forwarded by the client.
/// Never persisted server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl AiConfig {
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        AiConfig {
            provider: ProviderKind::OpenRouter,
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// The API key, if one was supplied and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    pub fn site_url(&self) -> Option<&str> {
        non_blank(self.site_url.as_deref())
    }

    pub fn site_name(&self) -> Option<&str> {
        non_blank(self.site_name.as_deref())
    }

    /// True when this config alone is enough to reach a provider, without
    /// relying on the server's managed credential.
    pub fn is_self_sufficient(&self) -> bool {
        self.api_key().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_serde_names() {
        let kind: ProviderKind = serde_json::from_str(r#""openrouter""#).unwrap();
        assert_eq!(kind, ProviderKind::OpenRouter);
        let kind: ProviderKind = serde_json::from_str(r#""gemini""#).unwrap();
        assert_eq!(kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_config_deserializes_camel_case_fields() {
        let config: AiConfig = serde_json::from_value(serde_json::json!({
            "provider": "openrouter",
            "apiKey": "sk-or-123",
            "model": "mistralai/mistral-7b",
            "siteUrl": "https://example.dev"
        }))
        .unwrap();
        assert_eq!(config.api_key(), Some("sk-or-123"));
        assert_eq!(config.model(), Some("mistralai/mistral-7b"));
        assert_eq!(config.site_url(), Some("https://example.dev"));
        assert!(config.site_name().is_none());
    }

    #[test]
    fn test_blank_key_is_not_self_sufficient() {
        let config = AiConfig::openrouter("   ");
        assert!(!config.is_self_sufficient());
        assert!(AiConfig::openrouter("key").is_self_sufficient());
    }

    #[test]
    fn test_missing_provider_defaults_to_gemini() {
        let config: AiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
    }
}
