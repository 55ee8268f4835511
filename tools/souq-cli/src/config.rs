//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use souq_commerce::shipping::{ShippingConfig, DEFAULT_QUOTE_CAPACITY};
use souq_data::TimeoutConfig;

/// Contents of `souq.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SouqConfig {
    /// Shipping calculator settings.
    #[serde(default)]
    pub shipping: ShippingConfig,

    /// Store lookup timeouts.
    #[serde(default)]
    pub lookups: TimeoutConfig,

    /// Data sources.
    #[serde(default)]
    pub data: DataConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,

    /// Quote cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl SouqConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }
}

/// Where rates, profiles and coupons come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Fixture file (TOML or JSON), relative to the config file.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Quote cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached quotes.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_QUOTE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
