//! Stand-in for a cache store that could not be opened.
//!
//! Every call fails with `CacheUnavailable`, which the series service
//! treats as a miss, so requests still reach the upstream.

use crate::domain::error::StockviewError;
use crate::domain::price::Series;
use crate::ports::cache_port::CachePort;
use std::time::Duration;

pub struct UnavailableCacheAdapter {
    reason: String,
}

impl UnavailableCacheAdapter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StockviewError {
        StockviewError::cache(self.reason.clone())
    }
}

impl CachePort for UnavailableCacheAdapter {
    fn get(&self, _symbol: &str) -> Result<Option<Series>, StockviewError> {
        Err(self.error())
    }

    fn put(&self, _symbol: &str, _series: &Series, _ttl: Duration) -> Result<(), StockviewError> {
        Err(self.error())
    }

    fn invalidate(&self, _symbol: &str) -> Result<bool, StockviewError> {
        Err(self.error())
    }
}
