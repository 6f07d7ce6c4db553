pub mod api;
pub mod config;
pub mod core;
pub mod providers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::api::AppState;
use crate::core::aggregator::RateAggregator;
use crate::providers::pydolar::{DEFAULT_BASE_URL, PyDolarProvider};

/// Wire the provider and aggregator out of config. The state is the only
/// thing the routes close over; there is no process-global mutable state.
pub fn build_state(config: &config::AppConfig) -> Arc<AppState> {
    let base_url = config
        .providers
        .pydolar
        .as_ref()
        .map_or(DEFAULT_BASE_URL, |p| &p.base_url);
    let provider = Arc::new(PyDolarProvider::new(base_url));
    let aggregator = RateAggregator::new(provider, config.failure_policy);
    Arc::new(AppState { aggregator })
}

/// Load configuration and serve until the listener fails.
pub async fn run(config_path: Option<&str>, port_override: Option<u16>) -> Result<()> {
    info!("Bolivar rates service starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let state = build_state(&config);
    let router = api::app_router(state);

    let port = port_override.unwrap_or_else(|| config.effective_port());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
