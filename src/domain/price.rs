//! Daily price bars and the newest-first series that carries them.
//!
//! A [`Series`] always stores its points newest-first, the order the upstream
//! delivers them in. Anything that walks the series in time order goes
//! through [`Series::chronological`] and re-aligns its output afterwards.

use crate::domain::error::StockviewError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PricePoint {
    /// A bar where every price field equals `close`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// A derived column aligned positionally with the series it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl DerivedColumn {
    /// Column label used in tables and the split encoding, e.g. `200-Day MA`.
    pub fn label(&self) -> String {
        format!("{}-Day MA", self.window)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    points: Vec<PricePoint>,
    pub ma_short: Option<DerivedColumn>,
    pub ma_long: Option<DerivedColumn>,
}

impl Series {
    /// Builds a series in newest-first order regardless of input order.
    ///
    /// Dates must be unique.
    pub fn new(symbol: &str, mut points: Vec<PricePoint>) -> Result<Self, StockviewError> {
        points.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(StockviewError::data(format!(
                "duplicate date {} in series for {}",
                pair[0].date, symbol
            )));
        }
        Ok(Self {
            symbol: normalize_symbol(symbol),
            points,
            ma_short: None,
            ma_long: None,
        })
    }

    /// Newest-first points.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest-first view over the points.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &PricePoint> + ExactSizeIterator {
        self.points.iter().rev()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn with_indicators(mut self, ma_short: DerivedColumn, ma_long: DerivedColumn) -> Self {
        self.ma_short = Some(ma_short);
        self.ma_long = Some(ma_long);
        self
    }

    /// The raw price data without any derived columns.
    pub fn without_indicators(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            points: self.points.clone(),
            ma_short: None,
            ma_long: None,
        }
    }
}

/// Trim and upper-case a ticker symbol. Cache keys and fetches both go
/// through here.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Whether a normalized symbol can name a ticker: non-empty, only
/// `[A-Z0-9._^=-]`, and no `..` run. Anything else never reaches a data
/// source or a cache key.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && !symbol.contains("..")
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '='))
}
