//! Upstream market data port trait.

use crate::domain::error::StockviewError;
use crate::domain::price::Series;

/// Descriptive fields the upstream returns alongside the prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchMetadata {
    pub information: Option<String>,
    pub symbol: Option<String>,
    pub last_refreshed: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: Series,
    pub metadata: FetchMetadata,
}

pub trait DataPort {
    /// Fetch the full daily history for an already-normalized symbol.
    ///
    /// Fails with `NotFound`, `Upstream` or `Timeout`; implementations must
    /// not block past their configured timeout.
    fn fetch_daily(&self, symbol: &str) -> Result<FetchResult, StockviewError>;

    fn name(&self) -> &str;
}
