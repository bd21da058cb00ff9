//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file and layering environment overrides on
//! top of it.

use std::fs;
use std::path::Path;

use crate::error::{HcmError, HcmResult};

use super::types::AppConfig;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "HCM_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./config/hcm.yaml";

/// Loads and provides access to the service configuration.
///
/// # Example
///
/// ```no_run
/// use hcm_assistant::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/hcm.yaml")?
///     .with_overrides(|key| std::env::var(key).ok())?;
/// println!("Binding to {}", loader.config().server.bind_addr);
/// # Ok::<(), hcm_assistant::error::HcmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Loads configuration from a YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or mistyped fields (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> HcmResult<Self> {
        let config = Self::load_yaml::<AppConfig>(path.as_ref())?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> HcmResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| HcmError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| HcmError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Recognized keys: `PORT`, `JWT_SECRET`, `OPENAI_API_KEY`,
    /// `OPENAI_MODEL` and `OPENAI_BASE_URL`. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> HcmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| HcmError::ConfigParseError {
                path: "PORT".to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
            let host = self
                .config
                .server
                .bind_addr
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host);
            self.config.server.bind_addr = format!("{}:{}", host, port);
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.config.auth.jwt_secret = Some(secret);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.config.llm.api_key = Some(key);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.config.llm.model = model;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.config.llm.base_url = base_url;
        }
        Ok(self)
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the token secret, failing if none was provided.
    pub fn jwt_secret(&self) -> HcmResult<&str> {
        self.config
            .auth
            .jwt_secret
            .as_deref()
            .ok_or_else(|| HcmError::ConfigParseError {
                path: "JWT_SECRET".to_string(),
                message: "JWT_SECRET must be set".to_string(),
            })
    }
}
