//! `hcm-server`: loads configuration, seeds the store and serves the API.

use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hcm_assistant::api::{AppState, create_router};
use hcm_assistant::auth::{JwtKeys, hash_password};
use hcm_assistant::clock::SystemClock;
use hcm_assistant::config::{CONFIG_PATH_ENV, ConfigLoader, DEFAULT_CONFIG_PATH};
use hcm_assistant::llm::build_client;
use hcm_assistant::store::{MemoryStore, seed_demo_data};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hcm_assistant=debug")),
        )
        .init();

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let loader = ConfigLoader::load(&path)?.with_overrides(|key| std::env::var(key).ok())?;
    let jwt = JwtKeys::from_secret(
        loader.jwt_secret()?.as_bytes(),
        loader.config().auth.token_ttl_hours,
    );
    let config = loader.config().clone();
    info!(path = %path, bind_addr = %config.server.bind_addr, "Configuration loaded");

    let clock = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    if config.seed.enabled {
        let hash = hash_password(&config.seed.default_password)?;
        let summary = seed_demo_data(&store, &hash).await?;
        info!(?summary, "Seeded demo data");
    }

    let llm = build_client(&config.llm)?;
    info!(
        provider = llm.provider_name(),
        model = llm.model_name(),
        "Language model client ready"
    );

    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::new(config, store, llm, clock, jwt);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "HCM server listening");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
