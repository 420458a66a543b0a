//! Command implementations

use std::{path::PathBuf, sync::Arc};

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use super::{Cli, Commands};
use crate::{
    config::{self, EmbedderConfig, GeneratorConfig, Settings},
    error::{RagError, Result},
    evaluation::{
        DocumentMrrEvaluator, EvaluationReport, FaithfulnessEvaluator, SasEvaluator,
    },
    messages::ChatMessage,
    rag::{index_documents, Document, InMemoryDocumentStore, PubMedQaDataset, RagPipeline},
    services::{
        anthropic::AnthropicChatGenerator, embeddings::OpenAIEmbedder, ChatGenerator, Embedder,
    },
};

/// Execute the parsed command line
///
/// # Errors
///
/// Returns configuration, dataset and provider errors unchanged.
pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat {
            ref prompt,
            ref system,
            json,
        } => {
            let generator = generator(&cli, &settings, cli.model.clone(), json)?;
            let mut conversation = Vec::new();
            if let Some(system) = system {
                conversation.push(ChatMessage::system(system.clone()));
            }
            conversation.push(ChatMessage::user(prompt.clone()));

            let output = generator.run(conversation).await?;
            println!("{}", output.first_text().unwrap_or_default());
        }
        Commands::Ask {
            ref question,
            ref dataset,
            top_k,
        } => {
            let dataset = load_dataset(dataset.clone(), &settings)?;
            let embedder = embedder(&settings)?;
            let generator = generator(&cli, &settings, cli.model.clone(), false)?;
            let top_k = top_k.unwrap_or(settings.top_k);
            let pipeline = build_pipeline(&dataset, embedder, generator, top_k).await?;

            let answer = pipeline.run(question).await?;
            println!("{}\n", answer.data);
            println!("Sources:");
            for (rank, doc) in answer.documents.iter().enumerate() {
                println!(
                    "  [{}] ({:.3}) {}",
                    rank + 1,
                    doc.score.unwrap_or_default(),
                    preview(&doc.content, 120)
                );
            }
        }
        Commands::Evaluate {
            ref dataset,
            samples,
            seed,
            ref judge_model,
        } => {
            let dataset = load_dataset(dataset.clone(), &settings)?;
            let samples = samples.unwrap_or(settings.eval_samples);
            let seed = seed.or(settings.seed);
            let judge_model = judge_model
                .clone()
                .unwrap_or_else(|| settings.judge_model.clone());

            let embedder = embedder(&settings)?;
            let generator = generator(&cli, &settings, cli.model.clone(), false)?;
            let judge = generator_with_model(&cli, &settings, Some(judge_model), true)?;
            let pipeline =
                build_pipeline(&dataset, embedder.clone(), generator, settings.top_k).await?;

            let report = evaluate(&pipeline, &dataset, embedder, judge, samples, seed).await?;
            println!("{report}");
        }
        Commands::Config { show, init } => {
            let path = cli.config.clone().unwrap_or_else(config::settings_path);
            if init {
                if path.exists() {
                    return Err(RagError::InvalidInput(format!(
                        "{} already exists",
                        path.display()
                    )));
                }
                Settings::default().save_to_path(&path)?;
                println!("Wrote default settings to {}", path.display());
            }
            if show || !init {
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
        }
    }

    Ok(())
}

fn generator(
    cli: &Cli,
    settings: &Settings,
    model: Option<String>,
    json_mode: bool,
) -> Result<Arc<dyn ChatGenerator>> {
    generator_with_model(cli, settings, model.or_else(|| settings.model.clone()), json_mode)
}

fn generator_with_model(
    cli: &Cli,
    settings: &Settings,
    model: Option<String>,
    json_mode: bool,
) -> Result<Arc<dyn ChatGenerator>> {
    let mut config = GeneratorConfig::resolve(cli.api_key.clone(), model, json_mode)?;
    if let Some(url) = &settings.anthropic_base_url {
        config = config.with_base_url(url.clone());
    }
    Ok(Arc::new(AnthropicChatGenerator::new(config)?))
}

fn embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let mut config = EmbedderConfig::resolve(None, Some(settings.embedding_model.clone()))?
        .with_batch_size(settings.embedding_batch_size);
    if let Some(url) = &settings.embedding_base_url {
        config = config.with_base_url(url.clone());
    }
    Ok(Arc::new(OpenAIEmbedder::new(config)?))
}

fn load_dataset(path: Option<PathBuf>, settings: &Settings) -> Result<PubMedQaDataset> {
    let path = path.or_else(|| settings.dataset_path.clone()).ok_or_else(|| {
        RagError::InvalidConfig("no dataset given: pass --dataset or set dataset_path".to_string())
    })?;
    let dataset = PubMedQaDataset::load(&path, settings.dataset_limit)?;
    if dataset.is_empty() {
        return Err(RagError::InvalidInput(format!(
            "dataset {} has no records",
            path.display()
        )));
    }
    Ok(dataset)
}

async fn build_pipeline(
    dataset: &PubMedQaDataset,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn ChatGenerator>,
    top_k: usize,
) -> Result<RagPipeline> {
    let mut store = InMemoryDocumentStore::new();
    index_documents(embedder.as_ref(), &mut store, dataset.documents()).await?;
    Ok(RagPipeline::new(embedder, store, generator).with_top_k(top_k))
}

/// Answer sampled questions and score the answers
async fn evaluate(
    pipeline: &RagPipeline,
    dataset: &PubMedQaDataset,
    embedder: Arc<dyn Embedder>,
    judge: Arc<dyn ChatGenerator>,
    samples: usize,
    seed: Option<u64>,
) -> Result<EvaluationReport> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sampled = dataset.sample(samples, &mut rng);
    let total = sampled.len();

    let mut questions = Vec::with_capacity(total);
    let mut answers = Vec::with_capacity(total);
    let mut retrieved = Vec::with_capacity(total);
    let mut ground_truth_docs = Vec::with_capacity(total);
    let mut ground_truth_answers = Vec::with_capacity(total);

    println!("Running RAG pipeline on {total} questions...\n");
    for (i, record) in sampled.into_iter().enumerate() {
        info!(question = i + 1, total, "answering");
        let answer = pipeline.run(&record.instruction).await?;
        println!("[{}/{total}] Question: {}", i + 1, preview(&record.instruction, 100));
        println!("Answer: {}\n", preview(&answer.data, 100));

        questions.push(record.instruction.clone());
        answers.push(answer.data);
        retrieved.push(answer.documents);
        ground_truth_docs.push(vec![Document::new(record.context.clone())]);
        ground_truth_answers.push(record.response.clone());
    }

    println!("Running evaluation metrics...\n");
    let mrr = DocumentMrrEvaluator.run(&ground_truth_docs, &retrieved)?;
    let contexts: Vec<Vec<String>> = ground_truth_docs
        .iter()
        .map(|docs| docs.iter().map(|d| d.content.clone()).collect())
        .collect();
    let faithfulness = FaithfulnessEvaluator::new(judge)
        .run(&questions, &contexts, &answers)
        .await?;
    let sas = SasEvaluator::new(embedder)
        .run(&answers, &ground_truth_answers)
        .await?;

    Ok(EvaluationReport {
        questions: total,
        mrr,
        faithfulness,
        sas,
    })
}

/// First `max_chars` characters of `text`, with an ellipsis when cut
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rag::PubMedQaRecord,
        testing::{LetterEmbedder, ScriptedGenerator},
    };

    fn record(question: &str, context: &str, answer: &str) -> PubMedQaRecord {
        PubMedQaRecord {
            instruction: question.into(),
            context: context.into(),
            response: answer.into(),
        }
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_evaluate_end_to_end() {
        let dataset = PubMedQaDataset::from_records(vec![
            record("aaaa", "aaaa aaaa", "aaaa"),
            record("bbbb", "bbbb bbbb", "bbbb"),
        ]);
        let embedder: Arc<dyn Embedder> = Arc::new(LetterEmbedder);
        let generator = Arc::new(ScriptedGenerator::new(["aaaa", "bbbb"]));
        let judge = Arc::new(ScriptedGenerator::new([
            r#"{"statements": ["s"], "statement_scores": [1]}"#,
            r#"{"statements": ["s"], "statement_scores": [1]}"#,
        ]));

        let pipeline = build_pipeline(&dataset, embedder.clone(), generator, 1)
            .await
            .unwrap();
        let report = evaluate(&pipeline, &dataset, embedder, judge, 5, Some(3))
            .await
            .unwrap();

        assert_eq!(report.questions, 2);
        assert!((report.mrr.score - 1.0).abs() < 1e-9);
        assert!((report.faithfulness.score - 1.0).abs() < 1e-9);
        assert_eq!(report.sas.individual_scores.len(), 2);
    }

    #[test]
    fn test_load_dataset_requires_path() {
        let err = load_dataset(None, &Settings::default()).unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(_)));
    }
}
