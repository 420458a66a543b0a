//! PubMedQA instruction dataset loader
//!
//! Accepts a JSON Lines file (one record per line) or a single JSON array.
//! Each record needs `instruction` (the question), `context` (the passage) and
//! `response` (the reference answer); other fields are ignored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::document::Document;
use crate::error::{RagError, Result};

/// One question/context/answer triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubMedQaRecord {
    pub instruction: String,
    pub context: String,
    pub response: String,
}

impl PubMedQaRecord {
    /// The context passage as an unembedded document
    #[must_use]
    pub fn document(&self) -> Document {
        Document::new(self.context.clone())
    }
}

/// Records loaded from disk, in file order
#[derive(Debug, Clone, Default)]
pub struct PubMedQaDataset {
    records: Vec<PubMedQaRecord>,
}

impl PubMedQaDataset {
    #[must_use]
    pub fn from_records(records: Vec<PubMedQaRecord>) -> Self {
        Self { records }
    }

    /// Load at most `limit` records from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a record is malformed.
    pub fn load(path: &Path, limit: usize) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut records = if contents.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<PubMedQaRecord>>(&contents)
                .map_err(|e| dataset_error(path, e.line(), &e))?
        } else {
            parse_json_lines(path, &contents, limit)?
        };
        records.truncate(limit);

        info!(path = %path.display(), records = records.len(), "dataset loaded");
        Ok(Self { records })
    }

    #[must_use]
    pub fn records(&self) -> &[PubMedQaRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Context passages, one document per record
    #[must_use]
    pub fn documents(&self) -> Vec<Document> {
        self.records.iter().map(PubMedQaRecord::document).collect()
    }

    #[must_use]
    pub fn questions(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.instruction.as_str()).collect()
    }

    #[must_use]
    pub fn ground_truth_answers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.response.as_str()).collect()
    }

    /// Draw up to `amount` distinct records
    #[must_use]
    pub fn sample<R: Rng + ?Sized>(&self, amount: usize, rng: &mut R) -> Vec<&PubMedQaRecord> {
        self.records.choose_multiple(rng, amount).collect()
    }
}

fn parse_json_lines(path: &Path, contents: &str, limit: usize) -> Result<Vec<PubMedQaRecord>> {
    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if records.len() >= limit {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| dataset_error(path, index + 1, &e))?;
        records.push(record);
    }
    Ok(records)
}

fn dataset_error(path: &Path, line: usize, err: &serde_json::Error) -> RagError {
    RagError::Dataset {
        path: PathBuf::from(path),
        line,
        message: err.to_string(),
    }
}
