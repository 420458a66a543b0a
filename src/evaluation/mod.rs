//! RAG evaluation metrics
//!
//! - [`DocumentMrrEvaluator`]: rank of the first relevant retrieved document
//! - [`FaithfulnessEvaluator`]: LLM-judged support of answers by their context
//! - [`SasEvaluator`]: embedding similarity between predicted and reference answers

pub mod faithfulness;
pub mod mrr;
pub mod sas;

use std::fmt;

use serde::Serialize;

pub use faithfulness::{FaithfulnessEvaluator, FaithfulnessJudgement, FaithfulnessResult};
pub use mrr::DocumentMrrEvaluator;
pub use sas::SasEvaluator;

use crate::error::{RagError, Result};

/// Aggregate and per-item scores of a metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub score: f64,
    pub individual_scores: Vec<f64>,
}

impl MetricResult {
    #[must_use]
    pub fn from_scores(individual_scores: Vec<f64>) -> Self {
        Self {
            score: mean(&individual_scores),
            individual_scores,
        }
    }
}

/// Arithmetic mean, 0.0 for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

pub(crate) fn ensure_same_len(what: &str, left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(RagError::InvalidInput(format!(
            "{what}: got {left} and {right} items"
        )))
    }
}

/// Scores of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub questions: usize,
    pub mrr: MetricResult,
    pub faithfulness: FaithfulnessResult,
    pub sas: MetricResult,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        writeln!(f, "{rule}")?;
        writeln!(f, "EVALUATION RESULTS ({} questions)", self.questions)?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Document Mean Reciprocal Rank (MRR): {:.4}", self.mrr.score)?;
        writeln!(
            f,
            "Faithfulness Score: {:.4} ({} of {} answers judged)",
            self.faithfulness.score,
            self.faithfulness.judged(),
            self.faithfulness.individual_scores.len()
        )?;
        writeln!(f, "Semantic Answer Similarity (SAS): {:.4}", self.sas.score)?;
        writeln!(f)?;
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 0.0, 0.5]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_report_display() {
        let report = EvaluationReport {
            questions: 2,
            mrr: MetricResult::from_scores(vec![1.0, 0.5]),
            faithfulness: FaithfulnessResult::from_judgements(vec![None, None]),
            sas: MetricResult::from_scores(vec![0.25, 0.75]),
        };
        let text = report.to_string();
        assert!(text.contains("EVALUATION RESULTS (2 questions)"));
        assert!(text.contains("Document Mean Reciprocal Rank (MRR): 0.7500"));
        assert!(text.contains("Faithfulness Score: 0.0000 (0 of 2 answers judged)"));
        assert!(text.contains("Semantic Answer Similarity (SAS): 0.5000"));
    }
}
