//! pubmed-rag: retrieval-augmented question answering over PubMedQA
//!
//! Embeds the dataset's context passages into an in-memory store, answers
//! questions with Claude through [`services::anthropic::AnthropicChatGenerator`],
//! and scores answers with document MRR, faithfulness and semantic answer
//! similarity.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod messages;
pub mod rag;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use error::{RagError, Result};
pub use messages::{ChatMessage, Role};
pub use services::{ChatGenerator, Embedder, GeneratorOutput};
