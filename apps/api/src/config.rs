use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-3.5-turbo";
const DEFAULT_SITE_URL: &str = "https://cv.rayenft.dev/";
const DEFAULT_SITE_NAME: &str = "OptimumCV";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RUST_LOG: &str = "info";

/// Application configuration loaded from environment variables.
///
/// The managed AI credential is optional: without it the gateway only serves
/// requests that carry their own provider config.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub openrouter_api_base: String,
    pub openrouter_default_model: String,
    pub openrouter_site_url: String,
    pub openrouter_site_name: String,
    pub ai_timeout: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: optional_env("GOOGLE_GENAI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            openrouter_api_base: env_or("OPENROUTER_API_BASE", DEFAULT_OPENROUTER_API_BASE),
            openrouter_default_model: env_or("OPENROUTER_DEFAULT_MODEL", DEFAULT_OPENROUTER_MODEL),
            openrouter_site_url: env_or("OPENROUTER_SITE_URL", DEFAULT_SITE_URL),
            openrouter_site_name: env_or("OPENROUTER_SITE_NAME", DEFAULT_SITE_NAME),
            ai_timeout: Duration::from_secs(env_parsed(
                "AI_TIMEOUT_SECS",
                DEFAULT_AI_TIMEOUT_SECS,
                "a whole number of seconds",
            )?),
            max_upload_bytes: env_parsed(
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
                "a byte count",
            )?,
            port: env_parsed("PORT", DEFAULT_PORT, "a valid port number")?,
            rust_log: env_or("RUST_LOG", DEFAULT_RUST_LOG),
        })
    }
}

impl Default for Config {
    /// The values `from_env` falls back to, with no managed credential.
    fn default() -> Self {
        Config {
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            openrouter_api_base: DEFAULT_OPENROUTER_API_BASE.to_string(),
            openrouter_default_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            openrouter_site_url: DEFAULT_SITE_URL.to_string(),
            openrouter_site_name: DEFAULT_SITE_NAME.to_string(),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: DEFAULT_PORT,
            rust_log: DEFAULT_RUST_LOG.to_string(),
        }
    }
}

/// Blank values count as unset so an empty `GOOGLE_GENAI_API_KEY=` line in
/// `.env` does not enable the managed provider.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn env_parsed<T>(key: &str, default: T, expected: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be {expected}")),
        None => Ok(default),
    }
}
