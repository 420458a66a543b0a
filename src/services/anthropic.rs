//! Anthropic Claude chat generator
//!
//! Translates a [`ChatMessage`] conversation into a Messages API request,
//! makes a single non-streaming call and hands back one assistant reply.
//!
//! In JSON mode the model is only *asked* for JSON (through the system
//! directive and the final user turn); the reply is then repaired on a
//! best-effort basis with [`coerce_json`]. Nothing is enforced server-side.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::models::{GeneratorConfig, ANTHROPIC_VERSION},
    error::{RagError, Result},
    messages::{ChatMessage, Role},
};

use super::{
    adapters::{coerce_json, extract_text, ResponseBlock},
    ChatGenerator, GeneratorOutput,
};

/// Appended to the final user turn in JSON mode
pub const JSON_USER_SUFFIX: &str =
    "\n\nRespond with valid JSON only, with no additional text before or after the JSON.";

/// System directive used in JSON mode when the conversation has none
pub const DEFAULT_JSON_SYSTEM: &str =
    "You must respond with valid JSON only. Do not include any text outside the JSON object.";

/// Appended to an existing system directive in JSON mode
pub const JSON_SYSTEM_SUFFIX: &str =
    "\n\nYou must respond with valid JSON only. Do not include any text outside the JSON object.";

/// Chat generator backed by the Anthropic Messages API
///
/// Holds only its immutable configuration and a `reqwest` client, so one
/// instance can serve concurrent callers. No retries, backoff or timeouts are
/// applied beyond the client defaults.
pub struct AnthropicChatGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl AnthropicChatGenerator {
    /// Create a new generator
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be used as a header value or the
    /// HTTP client cannot be built.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    "x-api-key",
                    header::HeaderValue::from_str(config.api_key()).map_err(|_| {
                        RagError::InvalidConfig("Invalid API key format".to_string())
                    })?,
                );
                headers.insert(
                    "anthropic-version",
                    header::HeaderValue::from_static(ANTHROPIC_VERSION),
                );
                headers
            })
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a generator from `ANTHROPIC_API_KEY` and the default model
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingApiKey`] if no key is set.
    pub fn from_env(json_mode: bool) -> Result<Self> {
        Self::new(GeneratorConfig::resolve(None, None, json_mode)?)
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn build_request(&self, messages: &[ChatMessage]) -> MessagesRequest {
        let (messages, system) = convert_messages(messages, self.config.json_mode());
        MessagesRequest {
            model: self.config.model().to_string(),
            max_tokens: self.config.max_tokens(),
            messages,
            system,
        }
    }

    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url()))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            return Err(RagError::ApiError {
                provider: "anthropic".to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Translate a conversation into API messages plus an optional system directive
///
/// - user and assistant turns are kept in order; in JSON mode the user turn
///   that closes the conversation gets [`JSON_USER_SUFFIX`]
/// - system turns are lifted out; when there are several the last one wins
/// - any other role is dropped
fn convert_messages(
    messages: &[ChatMessage],
    json_mode: bool,
) -> (Vec<AnthropicMessage>, Option<String>) {
    let last = messages.len().saturating_sub(1);
    let mut converted = Vec::with_capacity(messages.len());
    let mut system = None;

    for (index, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::User => {
                let mut content = msg.text.clone();
                if json_mode && index == last {
                    content.push_str(JSON_USER_SUFFIX);
                }
                converted.push(AnthropicMessage {
                    role: "user".to_string(),
                    content,
                });
            }
            Role::Assistant => converted.push(AnthropicMessage {
                role: "assistant".to_string(),
                content: msg.text.clone(),
            }),
            Role::System => {
                let mut directive = msg.text.clone();
                if json_mode {
                    directive.push_str(JSON_SYSTEM_SUFFIX);
                }
                system = Some(directive);
            }
            Role::Tool | Role::Other(_) => {
                debug!(role = %msg.role, "dropping message with unsupported role");
            }
        }
    }

    if system.is_none() && json_mode {
        system = Some(DEFAULT_JSON_SYSTEM.to_string());
    }

    (converted, system)
}

#[async_trait]
impl ChatGenerator for AnthropicChatGenerator {
    fn model(&self) -> &str {
        self.config.model()
    }

    async fn run(&self, messages: Vec<ChatMessage>) -> Result<GeneratorOutput> {
        let request = self.build_request(&messages);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            has_system = request.system.is_some(),
            json_mode = self.config.json_mode(),
            "sending messages request"
        );

        let response = self.send(&request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
                "messages response received"
            );
        }

        let mut text = extract_text(&response.content);
        if self.config.json_mode() {
            text = coerce_json(&text);
        }

        Ok(GeneratorOutput {
            replies: vec![ChatMessage::assistant(text)],
        })
    }
}

// Anthropic API types

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
