//! Application state for the HCM API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::JwtKeys;
use crate::chat::ChatEngine;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::store::EntityStore;

/// Shared application state.
///
/// Everything here is built once at startup and cloned cheaply into each
/// request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    store: Arc<dyn EntityStore>,
    chat: Arc<ChatEngine>,
    jwt: JwtKeys,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the store, language model and clock into a chat engine and
    /// bundles them for the router.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn EntityStore>,
        llm: Arc<dyn LlmClient>,
        clock: Arc<dyn Clock>,
        jwt: JwtKeys,
    ) -> Self {
        let chat = ChatEngine::new(
            store.clone(),
            llm,
            clock.clone(),
            config.chat.clone(),
            &config.llm,
        );
        Self {
            config: Arc::new(config),
            store,
            chat: Arc::new(chat),
            jwt,
            clock,
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The entity store.
    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// The chat engine.
    pub fn chat(&self) -> &ChatEngine {
        &self.chat
    }

    /// Token signing keys.
    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    /// The time source.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
