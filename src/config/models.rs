//! Model configuration for the chat generator and the embedder

use std::fmt;

use crate::error::{RagError, Result};

/// Environment variable holding the Anthropic API key
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding the Anthropic endpoint
pub const ANTHROPIC_BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
/// Environment variable holding the embeddings API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the embeddings endpoint
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Output token cap sent with every completion request
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// Pick the explicit key, falling back to the environment value.
///
/// Empty strings count as absent on both sides.
fn resolve_api_key(
    explicit: Option<String>,
    from_env: Option<String>,
    provider: &str,
    env_var: &str,
) -> Result<String> {
    explicit
        .filter(|key| !key.is_empty())
        .or_else(|| from_env.filter(|key| !key.is_empty()))
        .ok_or_else(|| RagError::MissingApiKey {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
        })
}

fn redact(key: &str) -> String {
    match key.get(..4) {
        Some(prefix) if key.len() > 8 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}

/// Configuration of the Anthropic chat generator
///
/// Built once and never mutated by the generator. The API key is resolved at
/// construction, so a missing credential fails before any request is made.
#[derive(Clone)]
pub struct GeneratorConfig {
    api_key: String,
    model: String,
    json_mode: bool,
    max_tokens: u32,
    base_url: String,
}

impl GeneratorConfig {
    /// Resolve the configuration from explicit values and the process environment
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if neither `api_key` nor
    /// `ANTHROPIC_API_KEY` yields a non-empty key.
    pub fn resolve(
        api_key: Option<String>,
        model: Option<String>,
        json_mode: bool,
    ) -> Result<Self> {
        let config = Self::resolve_with(
            api_key,
            std::env::var(ANTHROPIC_API_KEY_ENV).ok(),
            model,
            json_mode,
        )?;

        Ok(match std::env::var(ANTHROPIC_BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    /// Resolve the configuration with an explicitly supplied environment value
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if no non-empty key is available.
    pub fn resolve_with(
        api_key: Option<String>,
        env_api_key: Option<String>,
        model: Option<String>,
        json_mode: bool,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, env_api_key, "anthropic", ANTHROPIC_API_KEY_ENV)?;

        Ok(Self {
            api_key,
            model: model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            json_mode,
            max_tokens: MAX_OUTPUT_TOKENS,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        })
    }

    /// Point the generator at a different endpoint (proxies, test servers)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub const fn json_mode(&self) -> bool {
        self.json_mode
    }

    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("json_mode", &self.json_mode)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration of the OpenAI-compatible embeddings client
#[derive(Clone)]
pub struct EmbedderConfig {
    api_key: String,
    model: String,
    base_url: String,
    batch_size: usize,
}

impl EmbedderConfig {
    /// Resolve the configuration from explicit values and the process environment
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if neither `api_key` nor
    /// `OPENAI_API_KEY` yields a non-empty key.
    pub fn resolve(api_key: Option<String>, model: Option<String>) -> Result<Self> {
        let config = Self::resolve_with(api_key, std::env::var(OPENAI_API_KEY_ENV).ok(), model)?;

        Ok(match std::env::var(OPENAI_BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if no non-empty key is available.
    pub fn resolve_with(
        api_key: Option<String>,
        env_api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, env_api_key, "openai", OPENAI_API_KEY_ENV)?;

        Ok(Self {
            api_key,
            model: model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Number of texts sent per embeddings request (at least one)
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
