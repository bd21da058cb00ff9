//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{HcmError, HcmResult};

use super::{CompletionRequest, LlmClient, LlmMessage, Role};

/// Client for any endpoint speaking the OpenAI `chat/completions` protocol.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<LlmMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

impl OpenAiClient {
    /// Builds a client whose every request is bounded by
    /// `config.timeout_secs`.
    pub fn new(api_key: String, config: &LlmConfig) -> HcmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HcmError::upstream(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_key,
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> HcmResult<String> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(LlmMessage {
            role: Role::System,
            content: request.system_prompt.clone(),
        });
        messages.extend(request.messages.iter().cloned());

        let body = ApiRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HcmError::upstream(format!("request timed out: {}", e))
                } else {
                    HcmError::upstream(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HcmError::upstream(format!("API error {}: {}", status, body)));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| HcmError::upstream(format!("failed to parse response: {}", e)))?;
        debug!(model = %self.model, choices = api_response.choices.len(), "Completion received");

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HcmError::upstream("model returned no choices"))?;
        choice
            .message
            .content
            .ok_or_else(|| HcmError::upstream("model returned an empty message"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
