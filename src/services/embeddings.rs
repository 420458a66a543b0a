//! OpenAI-compatible embeddings client
//!
//! Works with the OpenAI API and compatible servers (Ollama, LM Studio, vLLM)
//! exposing `POST {base_url}/embeddings`.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::models::EmbedderConfig,
    error::{RagError, Result},
};

use super::{Embedder, Embedding};

/// Embedder backed by an OpenAI-compatible endpoint
pub struct OpenAIEmbedder {
    client: Client,
    config: EmbedderConfig,
}

impl OpenAIEmbedder {
    /// Create a new embedder
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be used as a header value or the
    /// HTTP client cannot be built.
    pub fn new(config: EmbedderConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    "Authorization",
                    header::HeaderValue::from_str(&format!("Bearer {}", config.api_key())).map_err(
                        |_| RagError::InvalidConfig("Invalid API key format".to_string()),
                    )?,
                );
                headers
            })
            .build()?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: self.config.model(),
            input: batch,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url()))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(RagError::ApiError {
                provider: "openai".to_string(),
                status: status.as_u16(),
                message: error_text,
            });
        }

        let mut api_response: EmbeddingResponse = response.json().await?;
        if api_response.data.len() != batch.len() {
            return Err(RagError::InvalidResponse {
                provider: "openai".to_string(),
                message: format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    api_response.data.len()
                ),
            });
        }

        api_response.data.sort_by_key(|item| item.index);
        Ok(api_response
            .data
            .into_iter()
            .map(|item| item.embedding)
            .collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn model(&self) -> &str {
        self.config.model()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size()) {
            debug!(model = self.config.model(), batch = batch.len(), "embedding batch");
            embeddings.extend(self.embed_batch(batch).await?);
        }
        Ok(embeddings)
    }
}

/// Cosine similarity of two vectors
///
/// Returns 0.0 for vectors of different length or with zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
