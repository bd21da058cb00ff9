//! Language model seam.
//!
//! The chat engine only talks to an [`LlmClient`]. One client is built at
//! startup and shared through the application state.

mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::error::{HcmError, HcmResult};

pub use openai::OpenAiClient;

/// Who wrote a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system prompt.
    System,
    /// The person chatting.
    User,
    /// The assistant.
    Assistant,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn.
    pub content: String,
}

impl LlmMessage {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything sent to the model for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt; sent as the first message.
    pub system_prompt: String,
    /// Conversation turns after the system prompt, oldest first.
    pub messages: Vec<LlmMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A chat-completion provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model's reply text. Any transport, status or decoding
    /// failure, and an empty choice list, is an [`HcmError::Upstream`].
    async fn complete(&self, request: &CompletionRequest) -> HcmResult<String>;

    /// Model name, for logging.
    fn model_name(&self) -> &str;

    /// Provider name, for logging.
    fn provider_name(&self) -> &str;
}

/// Stand-in used when no API key is configured. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredLlm;

#[async_trait]
impl LlmClient for UnconfiguredLlm {
    async fn complete(&self, _request: &CompletionRequest) -> HcmResult<String> {
        Err(HcmError::upstream("language model is not configured"))
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn provider_name(&self) -> &str {
        "unconfigured"
    }
}

/// Builds the process-wide client: [`OpenAiClient`] when an API key is
/// configured, [`UnconfiguredLlm`] otherwise.
pub fn build_client(config: &LlmConfig) -> HcmResult<Arc<dyn LlmClient>> {
    match config.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        Some(key) => {
            info!(model = %config.model, base_url = %config.base_url, "Language model configured");
            Ok(Arc::new(OpenAiClient::new(key.to_string(), config)?))
        }
        None => {
            warn!("No language model API key set; general questions will fail");
            Ok(Arc::new(UnconfiguredLlm))
        }
    }
}
