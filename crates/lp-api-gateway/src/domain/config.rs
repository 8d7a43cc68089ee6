//! Gateway configuration with validation.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Directory served for every path no route claims
    pub static_files: StaticConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.enabled {
            if self.rate_limit.global.max_requests == 0 || self.rate_limit.claim.max_requests == 0 {
                return Err(ConfigError::InvalidRateLimit(
                    "max_requests cannot be 0".into(),
                ));
            }
            if self.rate_limit.global.window.is_zero() || self.rate_limit.claim.window.is_zero() {
                return Err(ConfigError::InvalidRateLimit("window cannot be 0".into()));
            }
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub enabled: bool,
    /// `/` resolves to `index.html` inside this directory
    pub dir: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("public"),
        }
    }
}

/// One fixed-window style budget: `max_requests` per `window`, per IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateBudget {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Applies to every request
    pub global: RateBudget,
    /// Applies to claim submissions, on top of `global`
    pub claim: RateBudget,
    /// IPs exempt from rate limiting
    pub whitelist: Vec<IpAddr>,
    /// How often stale buckets are pruned
    pub cleanup_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global: RateBudget::new(100, Duration::from_secs(15 * 60)),
            claim: RateBudget::new(5, Duration::from_secs(60)),
            whitelist: Vec::new(),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// A bucket untouched for this long is full again and can be dropped.
    pub fn max_idle(&self) -> Duration {
        self.global.window.max(self.claim.window)
    }
}

/// Request limits configuration
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Max request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}
