//! Retrieval-augmented generation over the PubMedQA dataset

pub mod dataset;
pub mod document;
pub mod pipeline;
pub mod prompt;
pub mod store;

pub use dataset::{PubMedQaDataset, PubMedQaRecord};
pub use document::Document;
pub use pipeline::{index_documents, GeneratedAnswer, RagPipeline};
pub use prompt::PromptBuilder;
pub use store::InMemoryDocumentStore;
