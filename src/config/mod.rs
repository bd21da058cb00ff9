//! Configuration loading and management for the HCM assistant.
//!
//! This module loads the service configuration from a YAML file and applies
//! environment overrides (port, secrets, language model selection).
//!
//! # Example
//!
//! ```no_run
//! use hcm_assistant::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/hcm.yaml").unwrap();
//! println!("Model: {}", config.config().llm.model);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use types::{AppConfig, AuthConfig, ChatConfig, LlmConfig, SeedConfig, ServerConfig};
