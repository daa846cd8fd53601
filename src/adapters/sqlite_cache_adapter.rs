//! SQLite cache adapter.
//!
//! One row per symbol holding the split-frame JSON payload and its expiry
//! as a unix timestamp. Writes are single `INSERT OR REPLACE` statements.

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::error::StockviewError;
use crate::domain::frame::SplitFrame;
use crate::domain::price::Series;
use crate::ports::cache_port::CachePort;
use crate::ports::config_port::ConfigPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteCacheAdapter {
    pool: Pool<SqliteConnectionManager>,
    clock: Arc<dyn Clock>,
}

impl SqliteCacheAdapter {
    pub fn open<P: AsRef<Path>>(path: P, config: &dyn ConfigPort) -> Result<Self, StockviewError> {
        let path = path.as_ref();
        // surface an unopenable path now rather than after the pool timeout
        rusqlite::Connection::open(path)
            .map_err(|e| StockviewError::cache(format!("{}: {e}", path.display())))?;

        let pool_size = config.get_int("cache_pool_size", 4).max(1) as u32;
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        });
        Self::from_manager(manager, pool_size, Arc::new(SystemClock))
    }

    pub fn in_memory() -> Result<Self, StockviewError> {
        Self::in_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Result<Self, StockviewError> {
        // one connection so every caller sees the same in-memory database
        Self::from_manager(SqliteConnectionManager::memory(), 1, clock)
    }

    fn from_manager(
        manager: SqliteConnectionManager,
        pool_size: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StockviewError> {
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e: r2d2::Error| StockviewError::cache(e.to_string()))?;

        let adapter = Self { pool, clock };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockviewError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| StockviewError::cache(e.to_string()))
    }

    fn initialize_schema(&self) -> Result<(), StockviewError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS cache_entries (
                    symbol TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    expires_at INTEGER NOT NULL
                );",
            )
            .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))
    }

    /// Delete every expired row. Returns the number removed.
    pub fn purge_expired(&self) -> Result<usize, StockviewError> {
        let now = self.clock.now().timestamp();
        self.conn()?
            .execute(
                "DELETE FROM cache_entries WHERE expires_at <= ?1",
                params![now],
            )
            .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))
    }

    fn delete(&self, symbol: &str) -> Result<usize, StockviewError> {
        self.conn()?
            .execute(
                "DELETE FROM cache_entries WHERE symbol = ?1",
                params![symbol],
            )
            .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))
    }
}

impl CachePort for SqliteCacheAdapter {
    fn get(&self, symbol: &str) -> Result<Option<Series>, StockviewError> {
        let now = self.clock.now().timestamp();
        let row: Option<(String, i64)> = self
            .conn()?
            .query_row(
                "SELECT payload, expires_at FROM cache_entries WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))?;

        let Some((payload, expires_at)) = row else {
            return Ok(None);
        };

        if now >= expires_at {
            self.conn()?
                .execute(
                    "DELETE FROM cache_entries WHERE symbol = ?1 AND expires_at <= ?2",
                    params![symbol, now],
                )
                .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))?;
            return Ok(None);
        }

        match SplitFrame::from_json(&payload).and_then(|f| f.to_series(symbol)) {
            Ok(series) => Ok(Some(series)),
            Err(err) => {
                tracing::warn!(%symbol, error = %err, "discarding undecodable cache entry");
                self.delete(symbol)?;
                Ok(None)
            }
        }
    }

    fn put(&self, symbol: &str, series: &Series, ttl: Duration) -> Result<(), StockviewError> {
        let payload = SplitFrame::from_series(&series.without_indicators()).to_json()?;
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| StockviewError::cache(format!("ttl out of range: {ttl:?}")))?;
        let expires_at = self
            .clock
            .now()
            .timestamp()
            .checked_add(ttl_secs)
            .ok_or_else(|| StockviewError::cache(format!("ttl out of range: {ttl:?}")))?;

        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO cache_entries (symbol, payload, expires_at)
                 VALUES (?1, ?2, ?3)",
                params![symbol, payload, expires_at],
            )
            .map_err(|e: rusqlite::Error| StockviewError::cache(e.to_string()))?;
        Ok(())
    }

    fn invalidate(&self, symbol: &str) -> Result<bool, StockviewError> {
        Ok(self.delete(symbol)? > 0)
    }
}
