//! Application configuration.
//!
//! Reads and validates every recognized key through a [`ConfigPort`] before
//! any adapter is built.

use crate::domain::error::StockviewError;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_CACHE_URL: &str = "sqlite://stockview_cache.db";
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
/// One year.
pub const MAX_CACHE_TTL_SECONDS: u64 = 365 * 24 * 3600;
pub const DEFAULT_SHORT_WINDOW: usize = 200;
pub const DEFAULT_LONG_WINDOW: usize = 500;
pub const DEFAULT_PLOT_LOOKBACK_POINTS: usize = 730;
pub const DEFAULT_IMAGES_DIR: &str = "static/images";
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Tunables the series service needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub cache_ttl: Duration,
    pub short_window: usize,
    pub long_window: usize,
    pub plot_lookback: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            plot_lookback: DEFAULT_PLOT_LOOKBACK_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub cache_url: String,
    pub images_dir: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub bind: String,
    pub service: ServiceSettings,
}

impl AppConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, StockviewError> {
        let service = ServiceSettings {
            cache_ttl: Duration::from_secs(at_most(
                "cache_ttl_seconds",
                positive(config, "cache_ttl_seconds", DEFAULT_CACHE_TTL_SECONDS)?,
                MAX_CACHE_TTL_SECONDS,
            )?),
            short_window: positive(config, "short_window", DEFAULT_SHORT_WINDOW as u64)? as usize,
            long_window: positive(config, "long_window", DEFAULT_LONG_WINDOW as u64)? as usize,
            plot_lookback: positive(
                config,
                "plot_lookback_points",
                DEFAULT_PLOT_LOOKBACK_POINTS as u64,
            )? as usize,
        };

        Ok(Self {
            api_key: non_empty(config, "api_key"),
            api_base_url: string_or(config, "api_base_url", DEFAULT_API_BASE_URL),
            cache_url: string_or(config, "cache_url", DEFAULT_CACHE_URL),
            images_dir: PathBuf::from(string_or(config, "images_dir", DEFAULT_IMAGES_DIR)),
            data_dir: non_empty(config, "data_dir").map(PathBuf::from),
            fetch_timeout: Duration::from_secs(positive(
                config,
                "fetch_timeout_seconds",
                DEFAULT_FETCH_TIMEOUT_SECONDS,
            )?),
            bind: string_or(config, "bind", DEFAULT_BIND),
            service,
        })
    }

    /// The API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let Some(key) = &self.api_key else {
            return "(unset)".to_string();
        };
        let len = key.chars().count();
        if len <= 4 {
            return "****".to_string();
        }
        let tail: String = key.chars().skip(len - 4).collect();
        format!("****{tail}")
    }
}

fn non_empty(config: &dyn ConfigPort, key: &str) -> Option<String> {
    config
        .get_string(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_or(config: &dyn ConfigPort, key: &str, default: &str) -> String {
    non_empty(config, key).unwrap_or_else(|| default.to_string())
}

fn at_most(key: &str, value: u64, max: u64) -> Result<u64, StockviewError> {
    if value > max {
        return Err(StockviewError::ConfigInvalid {
            key: key.to_uppercase(),
            reason: format!("must be at most {max}, got {value}"),
        });
    }
    Ok(value)
}

fn positive(config: &dyn ConfigPort, key: &str, default: u64) -> Result<u64, StockviewError> {
    let Some(raw) = non_empty(config, key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(StockviewError::ConfigInvalid {
            key: key.to_uppercase(),
            reason: "must be at least 1".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(_) => Err(StockviewError::ConfigInvalid {
            key: key.to_uppercase(),
            reason: format!("expected a positive integer, got {raw:?}"),
        }),
    }
}
