//! # Runtime Configuration
//!
//! Everything is read from `LP_*` environment variables. A value that does
//! not parse is reported and the default kept. An invalid denomination list
//! stops startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LP_DATA_DIR` | `.` |
//! | `LP_LOG_FILE` | `lixi.log` |
//! | `LP_SNAPSHOT_FILE` | `quantity.log` |
//! | `LP_HTTP_HOST` | `0.0.0.0` |
//! | `LP_HTTP_PORT` | `3000` |
//! | `LP_STATIC_DIR` | `public` |
//! | `LP_WATCH_INTERVAL_MS` | `1000` |
//! | `LP_DENOMINATIONS` | `500000:1,100000:1,50000:1,20000:10,10000:15` |
//! | `LP_RATE_LIMIT_ENABLED` | `true` |
//! | `LP_LOG_LEVEL` | falls back to `RUST_LOG`, then `info` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lp_api_gateway::GatewayConfig;
use lp_pool_engine::{PoolConfig, DEFAULT_WATCH_INTERVAL};
use tracing::{info, warn};

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub storage: StorageConfig,
    pub pool: PoolConfig,
    pub gateway: GatewayConfig,
    /// Poll period of the log change watcher.
    pub watch_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            pool: PoolConfig::default(),
            gateway: GatewayConfig::default(),
            watch_interval: DEFAULT_WATCH_INTERVAL,
        }
    }
}

/// Where the durable files live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Holds the lock file; relative file names below resolve against it.
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub snapshot_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            log_file: PathBuf::from("lixi.log"),
            snapshot_file: PathBuf::from("quantity.log"),
        }
    }
}

impl StorageConfig {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid LP_DENOMINATIONS '{value}': {source}")]
    InvalidDenominations {
        value: String,
        #[source]
        source: lp_pool_engine::ConfigError,
    },
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of
    /// a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("LP_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("LP_LOG_FILE") {
            config.storage.log_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("LP_SNAPSHOT_FILE") {
            config.storage.snapshot_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("LP_STATIC_DIR") {
            config.gateway.static_files.dir = PathBuf::from(dir);
        }

        override_parsed(&lookup, "LP_HTTP_HOST", &mut config.gateway.http.host);
        override_parsed(&lookup, "LP_HTTP_PORT", &mut config.gateway.http.port);
        override_parsed(
            &lookup,
            "LP_RATE_LIMIT_ENABLED",
            &mut config.gateway.rate_limit.enabled,
        );

        let mut watch_ms = config.watch_interval.as_millis() as u64;
        override_parsed(&lookup, "LP_WATCH_INTERVAL_MS", &mut watch_ms);
        if watch_ms == 0 {
            warn!("LP_WATCH_INTERVAL_MS must be positive; using default");
        } else {
            config.watch_interval = Duration::from_millis(watch_ms);
        }

        if let Some(value) = lookup("LP_DENOMINATIONS") {
            config.pool = PoolConfig::parse(&value)
                .map_err(|source| ConfigError::InvalidDenominations { value, source })?;
            info!(
                denominations = config.pool.denominations().len(),
                units = config.pool.total_initial(),
                "Loaded denominations from environment"
            );
        }

        Ok(config)
    }
}

fn override_parsed<T, F>(lookup: &F, key: &str, target: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable setting; using default"),
        }
    }
}

/// Resolve the log filter directive: `LP_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LP_LOG_LEVEL")
        .or_else(|| lookup("RUST_LOG"))
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}
