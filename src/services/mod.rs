//! Service layer for hosted model providers
//!
//! This module provides:
//! - [`ChatGenerator`]: conversation in, assistant replies out (Anthropic Claude)
//! - [`Embedder`]: texts in, fixed-dimension vectors out (OpenAI-compatible endpoints)
//! - response shaping shared by the adapters (text extraction, JSON repair)

pub mod adapters;
pub mod anthropic;
pub mod embeddings;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::Result, messages::ChatMessage};

/// Named outputs of a chat generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOutput {
    pub replies: Vec<ChatMessage>,
}

impl GeneratorOutput {
    /// Text of the first reply, if any
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.replies.first().map(|reply| reply.text.as_str())
    }
}

/// Core trait for chat generators
///
/// Implementations must be safe to call from several tasks at once; they keep
/// no per-call state.
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    /// Get the model name
    fn model(&self) -> &str;

    /// Generate replies for the given conversation
    async fn run(&self, messages: Vec<ChatMessage>) -> Result<GeneratorOutput>;
}

/// Dense vector produced by an [`Embedder`]
pub type Embedding = Vec<f32>;

/// Core trait for text embedders
///
/// Documents and queries must be embedded with the same model for their
/// vectors to be comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Get the model name
    fn model(&self) -> &str;

    /// Embed each text, preserving input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| crate::error::RagError::InvalidResponse {
                provider: self.model().to_string(),
                message: "no embedding returned".to_string(),
            })
    }
}
