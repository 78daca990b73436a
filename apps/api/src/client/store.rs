//! File-backed store for the user's AI settings.
//!
//! Holds two fixed keys in one JSON object: `ai_config` (the serialized
//! `AiConfig`) and `has_seen_ai_config` (whether the user was already asked
//! to configure AI).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::AiConfig;

pub const AI_CONFIG_KEY: &str = "ai_config";
pub const SEEN_PROMPT_KEY: &str = "has_seen_ai_config";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Config store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Write-then-rename so a crash never leaves a half-written file.
    fn write_all(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        f(&mut map);
        self.write_all(&map)
    }

    /// A stored record that no longer parses is treated as absent.
    pub fn load_config(&self) -> Result<Option<AiConfig>, StoreError> {
        let Some(value) = self.read_all()?.remove(AI_CONFIG_KEY) else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable stored AI config");
                Ok(None)
            }
        }
    }

    pub fn save_config(&self, config: &AiConfig) -> Result<(), StoreError> {
        let value = serde_json::to_value(config)?;
        self.update(|map| {
            map.insert(AI_CONFIG_KEY.to_string(), value);
        })
    }

    pub fn clear_config(&self) -> Result<(), StoreError> {
        self.update(|map| {
            map.remove(AI_CONFIG_KEY);
        })
    }

    pub fn has_seen_prompt(&self) -> Result<bool, StoreError> {
        Ok(self
            .read_all()?
            .get(SEEN_PROMPT_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    pub fn mark_prompt_seen(&self) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(SEEN_PROMPT_KEY.to_string(), Value::Bool(true));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("settings").join("ai.json"));
        (dir, store)
    }

    #[test]
    fn test_empty_store_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_config().unwrap(), None);
        assert!(!store.has_seen_prompt().unwrap());
    }

    #[test]
    fn test_config_round_trip_and_clear() {
        let (_dir, store) = store();
        let config = AiConfig {
            model: Some("mistralai/mistral-7b-instruct".to_string()),
            ..AiConfig::openrouter("sk-or-1")
        };
        store.save_config(&config).unwrap();
        store.mark_prompt_seen().unwrap();

        let loaded = store.load_config().unwrap().unwrap();
        assert_eq!(loaded.provider, ProviderKind::OpenRouter);
        assert_eq!(loaded.model(), Some("mistralai/mistral-7b-instruct"));
        assert!(store.has_seen_prompt().unwrap());

        store.clear_config().unwrap();
        assert_eq!(store.load_config().unwrap(), None);
        // clearing the config keeps the prompt flag
        assert!(store.has_seen_prompt().unwrap());
    }

    #[test]
    fn test_unreadable_config_entry_is_ignored() {
        let (_dir, store) = store();
        store.mark_prompt_seen().unwrap();
        fs::write(
            &store.path,
            r#"{"ai_config": {"provider": "unknown"}, "has_seen_ai_config": true}"#,
        )
        .unwrap();
        assert_eq!(store.load_config().unwrap(), None);
        assert!(store.has_seen_prompt().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = store();
        store.mark_prompt_seen().unwrap();
        fs::write(&store.path, "not json").unwrap();
        assert!(matches!(store.has_seen_prompt(), Err(StoreError::Json(_))));
    }
}
