//! Split tabular encoding of a [`Series`].
//!
//! `columns` holds the ordered field names, `index` the ordered row keys
//! (ISO dates, newest-first) and `data` one row per key with values aligned
//! to `columns`. Cache payloads and the JSON endpoint both use this shape.

use crate::domain::error::StockviewError;
use crate::domain::price::{DerivedColumn, PricePoint, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const OPEN_COLUMN: &str = "1. open";
pub const HIGH_COLUMN: &str = "2. high";
pub const LOW_COLUMN: &str = "3. low";
pub const CLOSE_COLUMN: &str = "4. close";
pub const VOLUME_COLUMN: &str = "5. volume";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFrame {
    pub columns: Vec<String>,
    pub index: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

impl SplitFrame {
    /// Encode a series, including any derived columns it carries.
    pub fn from_series(series: &Series) -> Self {
        let mut columns: Vec<String> = [OPEN_COLUMN, HIGH_COLUMN, LOW_COLUMN, CLOSE_COLUMN, VOLUME_COLUMN]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let derived: Vec<&DerivedColumn> = [&series.ma_short, &series.ma_long]
            .into_iter()
            .flatten()
            .collect();
        columns.extend(derived.iter().map(|c| c.label()));

        let mut index = Vec::with_capacity(series.len());
        let mut data = Vec::with_capacity(series.len());
        for (i, p) in series.points().iter().enumerate() {
            index.push(p.date.format(DATE_FORMAT).to_string());
            let mut row = vec![
                Some(p.open),
                Some(p.high),
                Some(p.low),
                Some(p.close),
                Some(p.volume as f64),
            ];
            row.extend(derived.iter().map(|c| c.get(i)));
            data.push(row);
        }

        Self {
            columns,
            index,
            data,
        }
    }

    /// Decode the raw price columns back into a series.
    ///
    /// The close column is required; open/high/low fall back to the close
    /// and volume to zero when absent. Derived columns are not restored.
    pub fn to_series(&self, symbol: &str) -> Result<Series, StockviewError> {
        let close_idx = locate_column(&self.columns, CLOSE_COLUMN, "close").ok_or_else(|| {
            StockviewError::data(format!(
                "could not find closing price column in {:?}",
                self.columns
            ))
        })?;
        let open_idx = locate_column(&self.columns, OPEN_COLUMN, "open");
        let high_idx = locate_column(&self.columns, HIGH_COLUMN, "high");
        let low_idx = locate_column(&self.columns, LOW_COLUMN, "low");
        let volume_idx = locate_column(&self.columns, VOLUME_COLUMN, "volume");

        if self.index.len() != self.data.len() {
            return Err(StockviewError::data(format!(
                "index has {} keys but data has {} rows",
                self.index.len(),
                self.data.len()
            )));
        }

        let mut points = Vec::with_capacity(self.data.len());
        for (key, row) in self.index.iter().zip(&self.data) {
            if row.len() != self.columns.len() {
                return Err(StockviewError::data(format!(
                    "row {key} has {} values for {} columns",
                    row.len(),
                    self.columns.len()
                )));
            }
            let date = NaiveDate::parse_from_str(key, DATE_FORMAT)
                .map_err(|e| StockviewError::data(format!("invalid row key {key}: {e}")))?;
            let close = row[close_idx]
                .ok_or_else(|| StockviewError::data(format!("missing close on {key}")))?;
            let field = |idx: Option<usize>| idx.and_then(|i| row[i]).unwrap_or(close);

            points.push(PricePoint {
                date,
                open: field(open_idx),
                high: field(high_idx),
                low: field(low_idx),
                close,
                volume: volume_idx.and_then(|i| row[i]).unwrap_or(0.0) as i64,
            });
        }

        Series::new(symbol, points)
    }

    pub fn to_json(&self) -> Result<String, StockviewError> {
        serde_json::to_string(self)
            .map_err(|e| StockviewError::data(format!("failed to encode frame: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self, StockviewError> {
        serde_json::from_str(json)
            .map_err(|e| StockviewError::data(format!("failed to decode frame: {e}")))
    }
}

/// Exact name first, otherwise the first column whose name contains `keyword`.
fn locate_column(columns: &[String], exact: &str, keyword: &str) -> Option<usize> {
    columns
        .iter()
        .position(|c| c == exact)
        .or_else(|| columns.iter().position(|c| c.contains(keyword)))
}
