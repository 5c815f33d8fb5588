//! TOML-based service configuration.

use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::registry::{self, Node, Registry, StorageSite};

/// Environment variable overriding [`DashboardConfig::base_url`].
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
/// Environment variable overriding [`ServerConfig::seed`].
pub const ENV_SEED: &str = "GRID_SEED";

/// Top-level configuration parsed from TOML.
///
/// Every section is optional and defaults to the built-in ERCOT setup. Load
/// with [`ServiceConfig::from_toml_file`] or start from
/// [`ServiceConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// HTTP listener and randomness.
    #[serde(default)]
    pub server: ServerConfig,
    /// Market-wide parameters.
    #[serde(default)]
    pub market: MarketConfig,
    /// Terminal dashboard client.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Log filter and format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Node and storage catalogs.
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// HTTP listener and randomness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, `host:port`. The host may be an IP or a resolvable
    /// name such as `localhost`.
    pub bind: String,
    /// Fixed seed for every request's RNG. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            seed: None,
        }
    }
}

/// Market-wide parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Node used by the history and spread endpoints when no `?node=` is given.
    pub reference_node: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            reference_node: "A".to_string(),
        }
    }
}

/// Terminal dashboard client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// API root, without a trailing `/api`.
    pub base_url: String,
    /// Per-request timeout (seconds, > 0).
    pub timeout_secs: u64,
    /// How long a fetched payload is reused (seconds).
    pub cache_ttl_secs: u64,
    /// Auto-refresh interval (seconds, > 0).
    pub refresh_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 300,
            refresh_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

/// Log filter and format.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Node and storage catalogs. Omitted lists fall back to the ERCOT catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub nodes: Vec<Node>,
    pub storage: Vec<StorageSite>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            nodes: registry::default_nodes(),
            storage: registry::default_storage(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error, PartialEq)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"server.bind"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ServiceConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Applies environment overrides through `lookup`.
    ///
    /// Takes the lookup as a closure so callers (and tests) decide where
    /// variables come from; the binary passes `std::env::var(..).ok()`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `GRID_SEED` is not a valid `u64`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            self.dashboard.base_url = url;
        }
        if let Some(raw) = lookup(ENV_SEED).filter(|v| !v.is_empty()) {
            let seed = raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::new(
                    ENV_SEED,
                    format!("expected an unsigned integer, got \"{raw}\": {e}"),
                )
            })?;
            self.server.seed = Some(seed);
        }
        Ok(())
    }

    /// Resolved listen address; the first result wins for a hostname.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `server.bind` is not `host:port` or the
    /// host does not resolve.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = &self.server.bind;
        let invalid =
            |message: String| ConfigError::new("server.bind", format!("\"{bind}\": {message}"));
        bind.to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses resolved".to_string()))
    }

    /// Validates the catalogs and wraps them in a [`Registry`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` carrying the first catalog violation.
    pub fn build_registry(&self) -> Result<Registry, ConfigError> {
        Registry::new(self.registry.nodes.clone(), self.registry.storage.clone())
            .map_err(|e| ConfigError::new("registry", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(e);
        }

        match self.build_registry() {
            Ok(registry) => {
                if registry.node(&self.market.reference_node).is_none() {
                    errors.push(ConfigError::new(
                        "market.reference_node",
                        format!("unknown node \"{}\"", self.market.reference_node),
                    ));
                }
            }
            Err(e) => errors.push(e),
        }

        let dash = &self.dashboard;
        if !(dash.base_url.starts_with("http://") || dash.base_url.starts_with("https://")) {
            errors.push(ConfigError::new(
                "dashboard.base_url",
                format!("must start with http:// or https://, got \"{}\"", dash.base_url),
            ));
        }
        if dash.timeout_secs == 0 {
            errors.push(ConfigError::new("dashboard.timeout_secs", "must be > 0"));
        }
        if dash.refresh_secs == 0 {
            errors.push(ConfigError::new("dashboard.refresh_secs", "must be > 0"));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigError::new(
                "logging.level",
                format!(
                    "must be one of {}, got \"{}\"",
                    LOG_LEVELS.join(", "),
                    self.logging.level
                ),
            ));
        }

        errors
    }
}
