//! Indexing and query pipeline
//!
//! Query flow: embed question → retrieve top-k → render prompt → one
//! generator call → [`GeneratedAnswer`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::{document::Document, prompt::PromptBuilder, store::InMemoryDocumentStore};
use crate::{
    error::{RagError, Result},
    messages::ChatMessage,
    services::{ChatGenerator, Embedder},
};

pub const DEFAULT_TOP_K: usize = 3;

/// Embed `documents` and write them to `store`
///
/// # Errors
///
/// Returns an error if embedding fails, the embedder returns the wrong number
/// of vectors, or the store rejects the documents.
pub async fn index_documents(
    embedder: &dyn Embedder,
    store: &mut InMemoryDocumentStore,
    documents: Vec<Document>,
) -> Result<usize> {
    let contents: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
    let embeddings = embedder.embed(&contents).await?;
    if embeddings.len() != documents.len() {
        return Err(RagError::InvalidResponse {
            provider: embedder.model().to_string(),
            message: format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            ),
        });
    }

    let embedded = documents
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| doc.with_embedding(embedding))
        .collect();
    let written = store.write_documents(embedded)?;
    info!(written, model = embedder.model(), "documents indexed");
    Ok(written)
}

/// Answer produced by [`RagPipeline::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedAnswer {
    pub query: String,
    pub data: String,
    pub documents: Vec<Document>,
}

/// Retrieval-augmented question answering over an in-memory store
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    store: InMemoryDocumentStore,
    prompt_builder: PromptBuilder,
    generator: Arc<dyn ChatGenerator>,
    top_k: usize,
}

impl RagPipeline {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: InMemoryDocumentStore,
        generator: Arc<dyn ChatGenerator>,
    ) -> Self {
        Self {
            embedder,
            store,
            prompt_builder: PromptBuilder::default(),
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    #[must_use]
    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    #[must_use]
    pub fn store(&self) -> &InMemoryDocumentStore {
        &self.store
    }

    /// Retrieve the documents most relevant to `question`
    ///
    /// # Errors
    ///
    /// Returns an error if the question cannot be embedded.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Document>> {
        let query = self.embedder.embed_one(question).await?;
        Ok(self.store.query_by_embedding(&query, self.top_k))
    }

    /// Answer `question` from the indexed documents
    ///
    /// # Errors
    ///
    /// Returns embedding and generator errors unchanged.
    pub async fn run(&self, question: &str) -> Result<GeneratedAnswer> {
        let documents = self.retrieve(question).await?;
        debug!(retrieved = documents.len(), "documents retrieved");

        let prompt = self.prompt_builder.render(question, &documents);
        let output = self.generator.run(vec![ChatMessage::user(prompt)]).await?;

        Ok(GeneratedAnswer {
            query: question.to_string(),
            data: output.first_text().unwrap_or_default().to_string(),
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        messages::Role,
        testing::{LetterEmbedder, ScriptedGenerator},
    };

    async fn pipeline(generator: Arc<ScriptedGenerator>) -> RagPipeline {
        let mut store = InMemoryDocumentStore::new();
        index_documents(
            &LetterEmbedder,
            &mut store,
            vec![
                Document::new("zzzz"),
                Document::new("aaab"),
                Document::new("qqqq"),
            ],
        )
        .await
        .unwrap();
        RagPipeline::new(Arc::new(LetterEmbedder), store, generator).with_top_k(2)
    }

    #[tokio::test]
    async fn test_index_documents_embeds_all() {
        let mut store = InMemoryDocumentStore::new();
        let written = index_documents(
            &LetterEmbedder,
            &mut store,
            vec![Document::new("abc"), Document::new("def")],
        )
        .await
        .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.dimension(), Some(26));
    }

    #[tokio::test]
    async fn test_run_retrieves_and_prompts() {
        let generator = Arc::new(ScriptedGenerator::new(["It is aaab."]));
        let pipeline = pipeline(generator.clone()).await;

        let answer = pipeline.run("aaaa?").await.unwrap();
        assert_eq!(answer.query, "aaaa?");
        assert_eq!(answer.data, "It is aaab.");
        assert_eq!(answer.documents.len(), 2);
        assert_eq!(answer.documents[0].content, "aaab");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[0][0].role, Role::User);
        assert!(seen[0][0].text.contains("Context:\naaab\n"));
        assert!(seen[0][0].text.contains("Question: aaaa?"));
    }
}
