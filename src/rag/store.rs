//! In-memory document store with exhaustive cosine-similarity search

use tracing::debug;

use super::document::Document;
use crate::{
    error::{RagError, Result},
    services::embeddings::cosine_similarity,
};

/// Holds embedded documents for the lifetime of a run
///
/// Every query scans all documents; there is no index.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Vec<Document>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add documents to the store
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] if a document has no embedding or its
    /// dimension differs from documents already stored. Nothing is written in
    /// that case.
    pub fn write_documents(&mut self, documents: Vec<Document>) -> Result<usize> {
        let mut dimension = self.dimension();
        for doc in &documents {
            let Some(embedding) = &doc.embedding else {
                return Err(RagError::InvalidInput(format!(
                    "document {} has no embedding",
                    doc.id
                )));
            };
            match dimension {
                Some(dim) if dim != embedding.len() => {
                    return Err(RagError::InvalidInput(format!(
                        "document {} has dimension {}, store expects {dim}",
                        doc.id,
                        embedding.len()
                    )));
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
        }

        let written = documents.len();
        self.documents.extend(documents);
        debug!(written, total = self.documents.len(), "documents written");
        Ok(written)
    }

    /// Return the `top_k` documents most similar to `query`, best first
    ///
    /// Ties keep insertion order. Returned documents carry their score.
    #[must_use]
    pub fn query_by_embedding(&self, query: &[f32], top_k: usize) -> Vec<Document> {
        let mut scored: Vec<(f32, &Document)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                doc.embedding
                    .as_deref()
                    .map(|embedding| (cosine_similarity(query, embedding), doc))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, doc)| Document {
                score: Some(score),
                ..doc.clone()
            })
            .collect()
    }

    /// Embedding dimension of the stored documents
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.documents
            .first()
            .and_then(|doc| doc.embedding.as_ref())
            .map(Vec::len)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, embedding: Vec<f32>) -> Document {
        Document::new(content).with_embedding(embedding)
    }

    #[test]
    fn test_query_ranks_by_similarity() {
        let mut store = InMemoryDocumentStore::new();
        store
            .write_documents(vec![
                doc("east", vec![1.0, 0.0]),
                doc("north", vec![0.0, 1.0]),
                doc("north-east", vec![1.0, 1.0]),
            ])
            .unwrap();

        let results = store.query_by_embedding(&[0.0, 1.0], 2);
        let contents: Vec<_> = results.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["north", "north-east"]);
        assert!((results[0].score.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut store = InMemoryDocumentStore::new();
        store
            .write_documents(vec![doc("first", vec![1.0]), doc("second", vec![2.0])])
            .unwrap();

        let results = store.query_by_embedding(&[1.0], 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "first");
        assert_eq!(results[1].content, "second");
    }

    #[test]
    fn test_rejects_unembedded_and_mismatched_documents() {
        let mut store = InMemoryDocumentStore::new();
        let err = store
            .write_documents(vec![doc("ok", vec![1.0, 0.0]), Document::new("bare")])
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        assert!(store.is_empty());

        store.write_documents(vec![doc("ok", vec![1.0, 0.0])]).unwrap();
        assert!(store
            .write_documents(vec![doc("wide", vec![1.0, 0.0, 0.0])])
            .is_err());
        assert_eq!(store.count(), 1);
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        let store = InMemoryDocumentStore::new();
        assert!(store.query_by_embedding(&[1.0], 3).is_empty());
    }
}
