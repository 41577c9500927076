//! Service configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use advisor::AdvisorConfig;
use market_data::MarketDataConfig;
use persistence::PersistenceConfig;
use price_poller::PollerConfig;
use selection_manager::SelectionConfig;

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "COIN_DESK_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service-level configuration
    pub service: ServiceSettings,

    /// Selection limits and storage key
    pub selection: SelectionConfig,

    /// Price report polling
    pub poller: PollerConfig,

    /// Coin catalog, price and detail providers
    pub market_data: MarketDataConfig,

    /// Recommendation model
    pub advisor: AdvisorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Directory holding the persisted selection and caches
    pub data_dir: PathBuf,

    /// Pretty-print persisted JSON documents
    pub pretty_storage: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data"), pretty_storage: false }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "compact".to_string() }
    }
}

impl ServiceConfig {
    /// Persistence settings rooted at the service data directory
    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig { pretty: self.service.pretty_storage, ..PersistenceConfig::new(&self.service.data_dir) }
    }
}

/// Load configuration from a file, the environment, or both
///
/// The file is `path` when given, otherwise `COIN_DESK_CONFIG` when set.
/// Environment variables override file values.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let file = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from));

    let mut config = match file {
        Some(file) => {
            tracing::debug!("Loading configuration from file: {:?}", file);
            load_from_file(&file)?
        }
        None => ServiceConfig::default(),
    };

    // Override with environment variables
    load_from_env(&mut config)?;

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Load configuration from environment variables
pub fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    if let Ok(data_dir) = std::env::var("COIN_DESK_DATA_DIR") {
        config.service.data_dir = PathBuf::from(data_dir);
    }

    if let Ok(level) = std::env::var("COIN_DESK_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("COIN_DESK_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Ok(interval) = std::env::var("COIN_DESK_POLL_INTERVAL_MS") {
        config.poller.interval_ms = interval
            .parse()
            .with_context(|| format!("Invalid COIN_DESK_POLL_INTERVAL_MS: {interval}"))?;
    }

    config.market_data.apply_env();
    config.advisor.apply_env();

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    config.persistence().validate().map_err(|e| anyhow::anyhow!("Invalid persistence config: {e}"))?;
    config.selection.validate().map_err(|e| anyhow::anyhow!("Invalid selection config: {e}"))?;
    config.poller.validate().map_err(|e| anyhow::anyhow!("Invalid poller config: {e}"))?;
    config.market_data.validate().map_err(|e| anyhow::anyhow!("Invalid market data config: {e}"))?;
    config.advisor.validate().map_err(|e| anyhow::anyhow!("Invalid advisor config: {e}"))?;

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))
}
