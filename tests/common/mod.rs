#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;
use stockview::domain::error::StockviewError;
use stockview::domain::price::{PricePoint, Series};
use stockview::domain::regime::RegimePoint;
use stockview::ports::cache_port::CachePort;
use stockview::ports::chart_port::{ChartArtifact, ChartPort};
use stockview::ports::data_port::{DataPort, FetchMetadata, FetchResult};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// `count` consecutive calendar days from `start`, closes rising by one
/// from `base_close`.
pub fn generate_points(start: &str, count: usize, base_close: f64) -> Vec<PricePoint> {
    let start = date(start);
    (0..count)
        .map(|i| {
            let close = base_close + i as f64;
            PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + i as i64,
            }
        })
        .collect()
}

pub fn generate_series(symbol: &str, start: &str, count: usize, base_close: f64) -> Series {
    Series::new(symbol, generate_points(start, count, base_close)).unwrap()
}

/// Data port serving canned series and counting fetches per symbol.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, StockviewError>,
    fetches: Mutex<HashMap<String, usize>>,
    gate: Option<Arc<Barrier>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Mutex::new(HashMap::new()),
            gate: None,
        }
    }

    /// Hold every fetch until `gate` has as many waiters as it was built for.
    pub fn with_gate(mut self, gate: Arc<Barrier>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, error: StockviewError) -> Self {
        self.errors.insert(symbol.to_string(), error);
        self
    }

    pub fn fetch_count(&self, symbol: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }
}

fn clone_error(err: &StockviewError) -> StockviewError {
    match err {
        StockviewError::NotFound { symbol } => StockviewError::NotFound {
            symbol: symbol.clone(),
        },
        StockviewError::Upstream { symbol, reason } => StockviewError::Upstream {
            symbol: symbol.clone(),
            reason: reason.clone(),
        },
        StockviewError::Timeout { symbol } => StockviewError::Timeout {
            symbol: symbol.clone(),
        },
        other => StockviewError::data(other.to_string()),
    }
}

impl DataPort for MockDataPort {
    fn fetch_daily(&self, symbol: &str) -> Result<FetchResult, StockviewError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_insert(0) += 1;

        if let Some(gate) = &self.gate {
            gate.wait();
        }

        if let Some(err) = self.errors.get(symbol) {
            return Err(clone_error(err));
        }
        let points = self
            .data
            .get(symbol)
            .cloned()
            .ok_or_else(|| StockviewError::NotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(FetchResult {
            series: Series::new(symbol, points)?,
            metadata: FetchMetadata {
                symbol: Some(symbol.to_string()),
                ..FetchMetadata::default()
            },
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Cache whose store is always unreachable.
pub struct FailingCache {
    pub attempts: AtomicUsize,
}

impl FailingCache {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }
}

impl CachePort for FailingCache {
    fn get(&self, _symbol: &str) -> Result<Option<Series>, StockviewError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StockviewError::cache("connection refused"))
    }

    fn put(&self, _symbol: &str, _series: &Series, _ttl: Duration) -> Result<(), StockviewError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StockviewError::cache("connection refused"))
    }

    fn invalidate(&self, _symbol: &str) -> Result<bool, StockviewError> {
        Err(StockviewError::cache("connection refused"))
    }
}

/// Chart port that keeps what it was asked to draw.
pub struct RecordingChart {
    pub calls: Mutex<Vec<(String, String, Vec<RegimePoint>)>>,
    pub fail: bool,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

impl ChartPort for RecordingChart {
    fn render(
        &self,
        points: &[RegimePoint],
        title: &str,
        name: &str,
    ) -> Result<ChartArtifact, StockviewError> {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), name.to_string(), points.to_vec()));
        if self.fail {
            return Err(StockviewError::Render {
                reason: "disk full".to_string(),
            });
        }
        Ok(ChartArtifact {
            path: format!("/tmp/{name}.svg").into(),
            url: format!("images/{name}.svg"),
        })
    }
}
