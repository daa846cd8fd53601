//! In-process cache adapter.

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::error::StockviewError;
use crate::domain::frame::SplitFrame;
use crate::domain::price::Series;
use crate::ports::cache_port::CachePort;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    expires_at: DateTime<Utc>,
}

pub struct MemoryCacheAdapter {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheAdapter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StockviewError {
        StockviewError::cache("memory cache lock poisoned")
    }
}

impl Default for MemoryCacheAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CachePort for MemoryCacheAdapter {
    fn get(&self, symbol: &str) -> Result<Option<Series>, StockviewError> {
        let now = self.clock.now();
        let entry = {
            let entries = self.entries.read().map_err(|_| Self::poisoned())?;
            entries.get(symbol).cloned()
        };

        let Some(entry) = entry else {
            return Ok(None);
        };

        if now >= entry.expires_at {
            let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
            // a concurrent put may have refreshed the entry in between
            if entries.get(symbol).is_some_and(|e| now >= e.expires_at) {
                entries.remove(symbol);
            }
            return Ok(None);
        }

        match SplitFrame::from_json(&entry.payload).and_then(|f| f.to_series(symbol)) {
            Ok(series) => Ok(Some(series)),
            Err(err) => {
                tracing::warn!(%symbol, error = %err, "discarding undecodable cache entry");
                let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
                if entries
                    .get(symbol)
                    .is_some_and(|e| e.payload == entry.payload)
                {
                    entries.remove(symbol);
                }
                Ok(None)
            }
        }
    }

    fn put(&self, symbol: &str, series: &Series, ttl: Duration) -> Result<(), StockviewError> {
        let payload = SplitFrame::from_series(&series.without_indicators()).to_json()?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StockviewError::cache(format!("invalid ttl: {e}")))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| StockviewError::cache(format!("ttl out of range: {ttl}")))?;
        let entry = CacheEntry {
            payload,
            expires_at,
        };

        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(symbol.to_string(), entry);
        Ok(())
    }

    fn invalidate(&self, symbol: &str) -> Result<bool, StockviewError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        Ok(entries.remove(symbol).is_some())
    }
}
