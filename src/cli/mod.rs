//! CLI argument parsing and command routing

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pubmed-rag: question answering and RAG evaluation over PubMedQA
#[derive(Debug, Parser)]
#[command(name = "pubmed-rag")]
#[command(about = "Retrieval-augmented QA over PubMedQA with Claude", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "PUBMED_RAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Anthropic API key (falls back to ANTHROPIC_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Claude model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send one prompt to Claude and print the reply
    Chat {
        /// The user prompt
        prompt: String,

        /// Optional system directive
        #[arg(long)]
        system: Option<String>,

        /// Ask for a JSON-only reply
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from the indexed dataset
    Ask {
        /// The question
        question: String,

        /// Dataset file (JSON Lines or JSON array)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Documents retrieved per question
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Run the pipeline on sampled questions and score it
    Evaluate {
        /// Dataset file (JSON Lines or JSON array)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Number of questions to sample
        #[arg(long)]
        samples: Option<usize>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Model judging faithfulness
        #[arg(long)]
        judge_model: Option<String>,
    },

    /// Manage the settings file
    Config {
        /// Print the effective settings
        #[arg(long)]
        show: bool,

        /// Write default settings to the settings path
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat() {
        let cli = Cli::try_parse_from(["pubmed-rag", "--model", "claude-x", "chat", "hi", "--json"])
            .unwrap();
        assert_eq!(cli.model.as_deref(), Some("claude-x"));
        match cli.command {
            Commands::Chat { prompt, system, json } => {
                assert_eq!(prompt, "hi");
                assert!(system.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "pubmed-rag",
            "evaluate",
            "--dataset",
            "data.jsonl",
            "--samples",
            "5",
            "--seed",
            "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate {
                dataset,
                samples,
                seed,
                judge_model,
            } => {
                assert_eq!(dataset, Some(PathBuf::from("data.jsonl")));
                assert_eq!(samples, Some(5));
                assert_eq!(seed, Some(9));
                assert!(judge_model.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
