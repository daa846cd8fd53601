//! Time-series cache port trait.

use crate::domain::error::StockviewError;
use crate::domain::price::Series;
use std::time::Duration;

/// TTL-keyed store of raw series, one entry per upper-cased symbol.
///
/// A `put` replaces the whole entry at once; readers see either the old
/// series or the new one. Errors mean the store itself is unreachable and
/// are reported as `CacheUnavailable`.
pub trait CachePort {
    /// The cached series, or `None` when absent or expired.
    fn get(&self, symbol: &str) -> Result<Option<Series>, StockviewError>;

    /// Store `series` under `symbol`, resetting its TTL.
    fn put(&self, symbol: &str, series: &Series, ttl: Duration) -> Result<(), StockviewError>;

    /// Remove the entry; returns whether one existed.
    fn invalidate(&self, symbol: &str) -> Result<bool, StockviewError>;
}
