//! Deterministic test doubles for the provider traits

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{
    error::Result,
    messages::ChatMessage,
    services::{ChatGenerator, Embedder, Embedding, GeneratorOutput},
};

/// Embeds text as lowercase letter counts
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    fn model(&self) -> &str {
        "letters"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut counts = vec![0.0_f32; 26];
                for c in text.chars().filter(char::is_ascii_alphabetic) {
                    counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                }
                counts
            })
            .collect())
    }
}

/// Replies with queued texts and records every conversation it receives
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn run(&self, messages: Vec<ChatMessage>) -> Result<GeneratorOutput> {
        self.seen.lock().unwrap().push(messages);
        let text = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Ok(GeneratorOutput {
            replies: vec![ChatMessage::assistant(text)],
        })
    }
}
