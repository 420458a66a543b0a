//! Faithfulness of generated answers to their context, judged by an LLM
//!
//! The judge splits each answer into statements and scores every statement 1
//! (supported by the context) or 0. An answer's score is the mean of its
//! statement scores. The judge must run in JSON mode.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{ensure_same_len, mean};
use crate::{
    error::Result,
    messages::ChatMessage,
    services::ChatGenerator,
};

const INSTRUCTIONS: &str = concat!(
    "Your task is to judge the faithfulness or groundedness of statements based ",
    "on context information. First, please extract statements from a provided ",
    "predicted answer to a question. Second, calculate a faithfulness score for each ",
    "statement made in the predicted answer. The score is 1 if the statement can be ",
    "inferred from the provided context or 0 if it cannot be inferred."
);

/// Structured verdict returned by the judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaithfulnessJudgement {
    pub statements: Vec<String>,
    pub statement_scores: Vec<f64>,
}

impl FaithfulnessJudgement {
    /// Mean statement score; an answer without statements scores 0
    #[must_use]
    pub fn score(&self) -> f64 {
        mean(&self.statement_scores)
    }
}

/// Scores of a faithfulness run
///
/// Answers whose verdict could not be parsed have `None` and are left out of
/// the aggregate score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaithfulnessResult {
    pub score: f64,
    pub individual_scores: Vec<Option<f64>>,
    pub judgements: Vec<Option<FaithfulnessJudgement>>,
}

impl FaithfulnessResult {
    #[must_use]
    pub fn from_judgements(judgements: Vec<Option<FaithfulnessJudgement>>) -> Self {
        let individual_scores: Vec<Option<f64>> = judgements
            .iter()
            .map(|j| j.as_ref().map(FaithfulnessJudgement::score))
            .collect();
        let judged: Vec<f64> = individual_scores.iter().flatten().copied().collect();

        Self {
            score: mean(&judged),
            individual_scores,
            judgements,
        }
    }

    /// Number of answers with a usable verdict
    #[must_use]
    pub fn judged(&self) -> usize {
        self.individual_scores.iter().flatten().count()
    }
}

/// LLM-judged faithfulness evaluator
pub struct FaithfulnessEvaluator {
    generator: Arc<dyn ChatGenerator>,
}

impl FaithfulnessEvaluator {
    /// `generator` must be configured for JSON output
    #[must_use]
    pub fn new(generator: Arc<dyn ChatGenerator>) -> Self {
        Self { generator }
    }

    /// Judge every (question, contexts, answer) triple in order
    ///
    /// # Errors
    ///
    /// Returns [`crate::RagError::InvalidInput`] on a length mismatch and
    /// generator errors unchanged. Unparseable verdicts are not errors.
    pub async fn run(
        &self,
        questions: &[String],
        contexts: &[Vec<String>],
        predicted_answers: &[String],
    ) -> Result<FaithfulnessResult> {
        ensure_same_len("questions and contexts", questions.len(), contexts.len())?;
        ensure_same_len(
            "questions and predicted answers",
            questions.len(),
            predicted_answers.len(),
        )?;

        let mut judgements = Vec::with_capacity(questions.len());
        for (index, ((question, context), answer)) in questions
            .iter()
            .zip(contexts)
            .zip(predicted_answers)
            .enumerate()
        {
            let prompt = build_prompt(question, context, answer);
            let output = self.generator.run(vec![ChatMessage::user(prompt)]).await?;
            let reply = output.first_text().unwrap_or_default();

            match serde_json::from_str::<FaithfulnessJudgement>(reply) {
                Ok(judgement) => {
                    debug!(index, score = judgement.score(), "faithfulness judged");
                    judgements.push(Some(judgement));
                }
                Err(e) => {
                    warn!(index, error = %e, "skipping unparseable faithfulness verdict");
                    judgements.push(None);
                }
            }
        }

        Ok(FaithfulnessResult::from_judgements(judgements))
    }
}

fn build_prompt(question: &str, contexts: &[String], answer: &str) -> String {
    let examples = [
        (
            json!({
                "questions": "What is the capital of Germany and when was it founded?",
                "contexts": ["Berlin is the capital of Germany and was founded in 1244."],
                "predicted_answers": "The capital of Germany, Berlin, was founded in the 13th century."
            }),
            json!({
                "statements": [
                    "Berlin is the capital of Germany.",
                    "Berlin was founded in 1244."
                ],
                "statement_scores": [1, 1]
            }),
        ),
        (
            json!({
                "questions": "What is the capital of France?",
                "contexts": ["Berlin is the capital of Germany."],
                "predicted_answers": "Paris"
            }),
            json!({
                "statements": ["Paris is the capital of France."],
                "statement_scores": [0]
            }),
        ),
    ];

    let mut prompt = format!(
        "{INSTRUCTIONS}\nGenerate the response in JSON format with the following keys:\n\
         [\"statements\", \"statement_scores\"]\n\
         Consider the instructions and the examples below to determine those values.\n\n\
         Examples:\n"
    );
    for (inputs, outputs) in &examples {
        prompt.push_str(&format!("Inputs:\n{inputs}\nOutputs:\n{outputs}\n"));
    }

    let inputs = json!({
        "questions": question,
        "contexts": contexts,
        "predicted_answers": answer,
    });
    prompt.push_str(&format!("Inputs:\n{inputs}\nOutputs:\n"));
    prompt
}
