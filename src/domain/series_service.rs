//! Series orchestration: cache lookup, fetch on miss, enrichment, rendering.

use crate::domain::config::ServiceSettings;
use crate::domain::error::StockviewError;
use crate::domain::indicator::with_moving_averages;
use crate::domain::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::domain::price::{is_valid_symbol, normalize_symbol, Series};
use crate::domain::regime::{classify_series, RegimePoint};
use crate::ports::cache_port::CachePort;
use crate::ports::chart_port::{ChartArtifact, ChartPort};
use crate::ports::data_port::DataPort;
use std::sync::Arc;

pub struct SeriesService {
    data: Arc<dyn DataPort + Send + Sync>,
    cache: Arc<dyn CachePort + Send + Sync>,
    chart: Arc<dyn ChartPort + Send + Sync>,
    settings: ServiceSettings,
    metrics: ServiceMetrics,
}

impl SeriesService {
    pub fn new(
        data: Arc<dyn DataPort + Send + Sync>,
        cache: Arc<dyn CachePort + Send + Sync>,
        chart: Arc<dyn ChartPort + Send + Sync>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            data,
            cache,
            chart,
            settings,
            metrics: ServiceMetrics::default(),
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The enriched series for `symbol`.
    ///
    /// A cache hit is served as-is for the whole TTL. Upstream failures of
    /// any kind come back as `NotFound`; a malformed or empty upstream
    /// series is a `Data` error. Nothing but a successful fetch is cached.
    /// A symbol that cannot name a ticker is `NotFound` without a lookup.
    pub fn get_series(&self, symbol: &str) -> Result<Series, StockviewError> {
        let symbol = normalize_symbol(symbol);
        if !is_valid_symbol(&symbol) {
            return Err(StockviewError::NotFound { symbol });
        }

        let raw = match self.cached(&symbol) {
            Some(series) => series,
            None => self.fetch_and_store(&symbol)?,
        };

        Ok(with_moving_averages(
            raw,
            self.settings.short_window,
            self.settings.long_window,
        ))
    }

    /// Fetch, enrich and chart `symbol`.
    pub fn render(&self, symbol: &str) -> Result<ChartArtifact, StockviewError> {
        let series = self.get_series(symbol)?;
        self.render_series(&series)
    }

    /// Chart an already-enriched series.
    pub fn render_series(&self, series: &Series) -> Result<ChartArtifact, StockviewError> {
        let points = self.regimes(series);
        let title = format!("{} Closing Price and Moving Averages", series.symbol);
        let artifact = self.chart.render(&points, &title, &series.symbol)?;
        tracing::debug!(
            symbol = %series.symbol,
            points = points.len(),
            path = %artifact.path.display(),
            "chart rendered"
        );
        Ok(artifact)
    }

    /// Classified points for the plot window, oldest-first.
    pub fn regimes(&self, series: &Series) -> Vec<RegimePoint> {
        classify_series(series, self.settings.plot_lookback)
    }

    /// Drop the cache entry for `symbol`. Returns whether one existed.
    pub fn invalidate(&self, symbol: &str) -> Result<bool, StockviewError> {
        let symbol = normalize_symbol(symbol);
        let removed = self.cache.invalidate(&symbol)?;
        tracing::info!(%symbol, removed, "cache entry invalidated");
        Ok(removed)
    }

    fn cached(&self, symbol: &str) -> Option<Series> {
        match self.cache.get(symbol) {
            Ok(Some(series)) => {
                self.metrics.cache_hit();
                tracing::debug!(%symbol, rows = series.len(), "cache hit");
                Some(series)
            }
            Ok(None) => {
                self.metrics.cache_miss();
                tracing::debug!(%symbol, "cache miss");
                None
            }
            Err(err) => {
                self.metrics.cache_error();
                self.metrics.cache_miss();
                tracing::warn!(%symbol, error = %err, "cache lookup failed, fetching upstream");
                None
            }
        }
    }

    fn fetch_and_store(&self, symbol: &str) -> Result<Series, StockviewError> {
        let fetched = self
            .data
            .fetch_daily(symbol)
            .map_err(|err| self.collapse_fetch_error(symbol, err))?;
        self.metrics.upstream_fetch();

        tracing::debug!(
            %symbol,
            source = self.data.name(),
            last_refreshed = fetched.metadata.last_refreshed.as_deref().unwrap_or("-"),
            rows = fetched.series.len(),
            "fetched upstream series"
        );

        let series = fetched.series;
        if series.is_empty() {
            self.metrics.data_error();
            return Err(StockviewError::data(format!(
                "upstream returned an empty series for {symbol}"
            )));
        }

        if let Err(err) = self.cache.put(symbol, &series, self.settings.cache_ttl) {
            self.metrics.cache_error();
            tracing::warn!(%symbol, error = %err, "cache store failed, serving uncached");
        }

        Ok(series)
    }

    fn collapse_fetch_error(&self, symbol: &str, err: StockviewError) -> StockviewError {
        match err {
            StockviewError::NotFound { .. } => {
                self.metrics.upstream_not_found();
                tracing::info!(%symbol, source = self.data.name(), "symbol not found upstream");
            }
            StockviewError::Timeout { .. } => {
                self.metrics.upstream_timeout();
                tracing::warn!(%symbol, source = self.data.name(), "upstream fetch timed out");
            }
            StockviewError::Upstream { ref reason, .. } => {
                self.metrics.upstream_error();
                tracing::warn!(%symbol, source = self.data.name(), %reason, "upstream fetch failed");
            }
            other => {
                if matches!(other, StockviewError::Data { .. }) {
                    self.metrics.data_error();
                }
                return other;
            }
        }
        StockviewError::NotFound {
            symbol: symbol.to_string(),
        }
    }
}
