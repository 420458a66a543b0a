//! Configuration management for pubmed-rag
//!
//! Layers, lowest priority first:
//! 1. Built-in defaults
//! 2. Settings file (`~/.config/pubmed-rag/settings.json` or `--config`)
//! 3. `.env` file and environment variables
//! 4. CLI parameters

pub mod models;
pub mod settings;

use std::path::PathBuf;

pub use self::{
    models::{EmbedderConfig, GeneratorConfig},
    settings::Settings,
};

/// Get the configuration directory path
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pubmed-rag")
}

/// Get the default settings file path
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        assert!(settings_path().ends_with("pubmed-rag/settings.json"));
    }
}
