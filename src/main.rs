//! Price Oracle service
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ PriceOracle  │───▶│ Gateway  │
//! │  (YAML)  │    │ (Mutex)      │    │ (HTTP)   │
//! └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Usage: `price_oracle [--env dev] [--port 8080]`

use anyhow::{Context, anyhow};
use std::sync::Arc;

use price_oracle::config::AppConfig;
use price_oracle::gateway::{self, state::AppState};
use price_oracle::logging::init_logging;
use price_oracle::oracle::PriceOracle;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).with_context(|| format!("loading {} config", env))?;
    let _log_guard = init_logging(&app_config);

    tracing::info!("Starting price oracle in {} mode", env);

    let oracle_config = &app_config.oracle;
    let catalog = oracle_config
        .build_catalog()
        .context("building adapter catalog")?;

    let mut initial = Vec::new();
    for id in oracle_config.initial_adapter_ids() {
        let adapter = catalog
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("adapter {} missing from catalog", id))?;
        tracing::info!(adapter = %id, name = adapter.name(), "registering initial adapter");
        initial.push(adapter);
    }

    let oracle = PriceOracle::new(
        oracle_config.governance,
        oracle_config.master_quote_asset,
        initial,
    )?;

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    let state = Arc::new(AppState::new(oracle, catalog));
    gateway::run_server(&app_config.gateway.host, port, state).await
}
