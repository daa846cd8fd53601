//! CSV file data adapter.
//!
//! Offline stand-in for the upstream provider: one `<SYMBOL>.csv` per
//! symbol with a `date,open,high,low,close,volume` header.

use crate::domain::error::StockviewError;
use crate::domain::price::{is_valid_symbol, PricePoint, Series};
use crate::ports::data_port::{DataPort, FetchMetadata, FetchResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_daily(&self, symbol: &str) -> Result<FetchResult, StockviewError> {
        // the symbol becomes a file name under base_path
        if !is_valid_symbol(symbol) {
            return Err(StockviewError::NotFound {
                symbol: symbol.to_string(),
            });
        }
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StockviewError::NotFound {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(StockviewError::Upstream {
                    symbol: symbol.to_string(),
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.deserialize::<CsvRow>() {
            let row = result.map_err(|e| {
                StockviewError::data(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
                .map_err(|e| StockviewError::data(format!("invalid date {:?}: {}", row.date, e)))?;

            points.push(PricePoint {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume as i64,
            });
        }

        let series = Series::new(symbol, points)?;
        let metadata = FetchMetadata {
            information: Some(format!("Daily prices from {}", path.display())),
            symbol: Some(series.symbol.clone()),
            last_refreshed: series.latest().map(|p| p.date.to_string()),
            time_zone: None,
        };

        Ok(FetchResult { series, metadata })
    }

    fn name(&self) -> &str {
        "csv"
    }
}
