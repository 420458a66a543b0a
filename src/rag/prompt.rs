//! Prompt template for RAG generation
//!
//! Placeholders: `{documents}` (retrieved contents, one per line) and
//! `{question}`.

use super::document::Document;
use crate::error::{RagError, Result};

/// Default question-answering template
pub const DEFAULT_TEMPLATE: &str = concat!(
    "Given the following information, answer the question.\n\n",
    "Context:\n{documents}\n\n",
    "Question: {question}\n",
    "Answer:"
);

/// Renders retrieved documents and a question into a single prompt
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptBuilder {
    /// Create a builder from a custom template
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the template lacks a `{question}`
    /// or `{documents}` placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in ["{question}", "{documents}"] {
            if !template.contains(placeholder) {
                return Err(RagError::InvalidConfig(format!(
                    "prompt template is missing {placeholder}"
                )));
            }
        }
        Ok(Self { template })
    }

    #[must_use]
    pub fn render(&self, question: &str, documents: &[Document]) -> String {
        let context = documents
            .iter()
            .map(|doc| doc.content.trim())
            .collect::<Vec<_>>()
            .join("\n");

        // single pass: substituted text is never scanned for placeholders
        let mut prompt = String::with_capacity(self.template.len() + context.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            prompt.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{documents}") {
                prompt.push_str(&context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{question}") {
                prompt.push_str(question);
                rest = after;
            } else {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
        prompt.push_str(rest);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_default_template() {
        let prompt = PromptBuilder::default().render(
            "Does aspirin help?",
            &[Document::new("Aspirin reduces fever. "), Document::new("It thins blood.")],
        );
        assert_eq!(
            prompt,
            "Given the following information, answer the question.\n\n\
             Context:\nAspirin reduces fever.\nIt thins blood.\n\n\
             Question: Does aspirin help?\nAnswer:"
        );
    }

    #[test]
    fn test_custom_template_validation() {
        assert!(PromptBuilder::new("Q: {question}").is_err());
        let builder = PromptBuilder::new("{documents} | {question}").unwrap();
        assert_eq!(builder.render("why?", &[Document::new("because")]), "because | why?");
    }

    #[test]
    fn test_placeholders_in_inputs_stay_literal() {
        let builder = PromptBuilder::new("{documents} | {question} {other}").unwrap();
        assert_eq!(
            builder.render("Q {documents}?", &[Document::new("see {question} here")]),
            "see {question} here | Q {documents}? {other}"
        );
    }
}
