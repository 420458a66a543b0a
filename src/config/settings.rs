//! Run settings for indexing, retrieval and evaluation (stored as JSON)

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::models::{
    ANTHROPIC_BASE_URL_ENV, DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL,
    OPENAI_BASE_URL_ENV,
};
use crate::error::{RagError, Result};

/// Settings shared by the `ask` and `evaluate` commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model answering RAG questions (generator default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model judging faithfulness
    pub judge_model: String,

    /// Custom Anthropic endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_base_url: Option<String>,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Custom OpenAI-compatible embeddings endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_base_url: Option<String>,

    /// Texts per embeddings request
    pub embedding_batch_size: usize,

    /// Documents retrieved per question
    pub top_k: usize,

    /// Dataset file (JSON Lines or JSON array)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,

    /// Records kept from the head of the dataset
    pub dataset_limit: usize,

    /// Questions sampled by `evaluate`
    pub eval_samples: usize,

    /// Sampling seed; random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: None,
            judge_model: "claude-sonnet-4-5-20250929".to_string(),
            anthropic_base_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_base_url: None,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            top_k: 3,
            dataset_path: None,
            dataset_limit: 1000,
            eval_samples: 25,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`
    ///
    /// Environment overrides are applied on top of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default_path = super::settings_path();
        let mut settings = Self::load_from_path(path.unwrap_or(default_path.as_path()))?;
        settings.apply_env();
        Ok(settings)
    }

    /// Load settings from a specific path
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| RagError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&contents).map_err(|e| RagError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        settings.validate().map_err(|message| RagError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })?;

        Ok(settings)
    }

    /// Save settings to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ANTHROPIC_BASE_URL_ENV) {
            if !url.is_empty() {
                self.anthropic_base_url = Some(url);
            }
        }
        if let Ok(url) = std::env::var(OPENAI_BASE_URL_ENV) {
            if !url.is_empty() {
                self.embedding_base_url = Some(url);
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be at least 1".to_string());
        }
        if self.embedding_batch_size == 0 {
            return Err("embedding_batch_size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.top_k, 3);
        assert_eq!(settings.dataset_limit, 1000);
        assert_eq!(settings.eval_samples, 25);
        assert!(settings.model.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Settings::load_from_path(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let settings = Settings {
            model: Some("claude-3-haiku-20240307".into()),
            top_k: 5,
            seed: Some(7),
            ..Settings::default()
        };
        settings.save_to_path(&path).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{"eval_samples": 10}"#).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded.eval_samples, 10);
        assert_eq!(loaded.top_k, 3);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from_path(&path),
            Err(RagError::ConfigParse { .. })
        ));

        fs::write(&path, r#"{"top_k": 0}"#).unwrap();
        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }
}
