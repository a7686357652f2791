use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use thiserror::Error;

use crate::adapter::{AdapterCatalog, AdapterRef, StaticAdapter};
use crate::core_types::{AdapterId, AssetId, Principal};
use crate::money;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub oracle: OracleConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    /// The only principal allowed to mutate state
    pub governance: Principal,
    pub master_quote_asset: AssetId,
    /// Known adapters. Enabled ones form the initial registry, in file order.
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdapterConfig {
    pub id: AdapterId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub prices: Vec<StaticPriceConfig>,
}

/// One fixed quote; `price` is already 18-decimal scaled, as a string
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StaticPriceConfig {
    pub base: AssetId,
    pub quote: AssetId,
    pub price: String,
}

fn default_enabled() -> bool {
    true
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.oracle.validate()?;
        Ok(config)
    }
}

impl OracleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for adapter in &self.adapters {
            if !seen.insert(adapter.id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate adapter id {}",
                    adapter.id
                )));
            }
        }
        Ok(())
    }

    /// Build every configured adapter, enabled or not
    pub fn build_catalog(&self) -> Result<AdapterCatalog, ConfigError> {
        let mut catalog = AdapterCatalog::new();
        for cfg in &self.adapters {
            let mut adapter = StaticAdapter::new(cfg.name.clone());
            for quote in &cfg.prices {
                let price = money::parse_raw(&quote.price).map_err(|e| {
                    ConfigError::Invalid(format!(
                        "adapter {} price {}/{}: {}",
                        cfg.name, quote.base, quote.quote, e
                    ))
                })?;
                adapter = adapter.with_price(quote.base, quote.quote, price);
            }
            catalog.insert(AdapterRef::new(cfg.id, Arc::new(adapter)));
        }
        Ok(catalog)
    }

    /// Ids of adapters registered at startup, in file order
    pub fn initial_adapter_ids(&self) -> Vec<AdapterId> {
        self.adapters
            .iter()
            .filter(|a| a.enabled)
            .map(|a| a.id)
            .collect()
    }
}
