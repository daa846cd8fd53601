//! Concrete adapter implementations for ports.

pub mod alpha_vantage_adapter;
pub mod csv_adapter;
pub mod env_config_adapter;
pub mod file_config_adapter;
pub mod memory_cache_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_cache_adapter;
pub mod svg_chart;
pub mod unavailable_cache_adapter;
#[cfg(feature = "web")]
pub mod web;

use crate::domain::error::StockviewError;
use std::path::PathBuf;

/// Cache store selected by `CACHE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    SqliteMemory,
    SqliteFile(PathBuf),
}

impl CacheBackend {
    /// `memory://`, `sqlite://:memory:`, `sqlite://<path>` or a bare path.
    pub fn parse(url: &str) -> Result<Self, StockviewError> {
        let url = url.trim();
        if url == "memory://" || url == "memory" {
            return Ok(CacheBackend::Memory);
        }

        let path = match url.split_once("://") {
            Some(("sqlite", rest)) => rest,
            Some((scheme, _)) => {
                return Err(StockviewError::ConfigInvalid {
                    key: "CACHE_URL".to_string(),
                    reason: format!("unsupported cache scheme {scheme:?}"),
                });
            }
            None => url,
        };

        match path {
            "" => Err(StockviewError::ConfigInvalid {
                key: "CACHE_URL".to_string(),
                reason: "missing cache path".to_string(),
            }),
            ":memory:" => Ok(CacheBackend::SqliteMemory),
            path => Ok(CacheBackend::SqliteFile(PathBuf::from(path))),
        }
    }
}
