//! Configuration types for the HCM assistant.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section and
//! field has a default, so a partial file is valid.

use serde::Deserialize;

/// The complete service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Token settings.
    pub auth: AuthConfig,
    /// Language model settings.
    pub llm: LlmConfig,
    /// Chat assistant tuning.
    pub chat: ChatConfig,
    /// Demo data settings.
    pub seed: SeedConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, as `host:port`.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Token settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of issued tokens, in hours.
    pub token_ttl_hours: u64,
    /// HMAC secret. Only ever read from the environment.
    #[serde(skip)]
    pub jwt_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: 24,
            jwt_secret: None,
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without the
    /// `/chat/completions` suffix.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// API key. Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            max_tokens: 800,
            api_key: None,
        }
    }
}

/// Chat assistant tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Most prior user turns forwarded to the language model.
    pub max_history_turns: usize,
    /// Rows shown by the earliest/latest arrival reports.
    pub top_arrivals: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 6,
            top_arrivals: 5,
        }
    }
}

/// Demo data settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Load the demo organization at startup.
    pub enabled: bool,
    /// Password shared by every seeded account.
    pub default_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_password: "password".to_string(),
        }
    }
}
