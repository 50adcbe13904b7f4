//! Configuration for the trade executor.
//!
//! Loaded from YAML with `${VAR}` / `${VAR:-default}` interpolation, or
//! assembled from environment variables when no config file exists.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_executor::config::load_config_or_env;
//!
//! // config.yaml if present, otherwise ALPACA_KEY / API_KEY etc.
//! let config = load_config_or_env(None)?;
//! let alpaca = config.broker.to_alpaca_config()?;
//! ```

mod broker;
mod execution;
mod observability;
mod persistence;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use broker::{BrokerConfig, RetrySettings};
pub use execution::ExecutionConfig;
pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use persistence::PersistenceConfig;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Broker connection.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Order polling.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Trade store.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Build configuration from process environment variables.
    ///
    /// Credentials come from `ALPACA_KEY` / `ALPACA_SECRET`, falling back to
    /// `API_KEY` / `SECRET_ALPACA_KEY`. `BASE_URL` overrides the trading API,
    /// `TRADER_ENV` selects paper or live and `TRADE_STORE_PATH` moves the
    /// JSON store.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable lookup.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
        };

        let mut config = Self::default();
        if let Some(key) = var(&["ALPACA_KEY", "API_KEY"]) {
            config.broker.api_key = key;
        }
        if let Some(secret) = var(&["ALPACA_SECRET", "SECRET_ALPACA_KEY"]) {
            config.broker.api_secret = secret;
        }
        config.broker.trading_url = var(&["BASE_URL"]);
        if let Some(env) = var(&["TRADER_ENV"]) {
            config.broker.environment = env;
        }
        if let Some(path) = var(&["TRADE_STORE_PATH"]) {
            config.persistence.store_path = path;
        }
        config
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` when given, else `config.yaml` when it exists, else the
/// environment.
///
/// # Errors
///
/// Returns a `ConfigError` if a file is used and fails to load, or if the
/// resulting configuration is invalid.
pub fn load_config_or_env(path: Option<&str>) -> Result<Config, ConfigError> {
    if path.is_some() || Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(path);
    }

    let config = Config::from_env();
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// Credentials are not checked here; see [`BrokerConfig::to_alpaca_config`].
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the offending setting.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.broker.environment()?;

    if config.broker.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "broker.timeout_secs must be positive".to_string(),
        ));
    }

    let retry = &config.broker.retry;
    if retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "broker.retry.max_attempts must be at least 1".to_string(),
        ));
    }
    if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "broker.retry.multiplier must be >= 1.0".to_string(),
        ));
    }

    config
        .execution
        .poll_policy()
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("execution: {e}")))?;

    if config.persistence.store_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "persistence.store_path must not be empty".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}
