//! Document type shared by the store, the pipeline and the evaluators

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::Embedding;

/// A passage of text, optionally embedded and scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
    /// Similarity to the query, set on retrieval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Document {
    /// Create a document with a fresh id
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            embedding: None,
            score: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Whether both documents carry the same text
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.content == other.content
    }
}
