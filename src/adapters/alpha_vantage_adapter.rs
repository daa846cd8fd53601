//! Alpha Vantage daily time-series provider.
//!
//! One `TIME_SERIES_DAILY` request per fetch with `outputsize=full`. Every
//! request is bounded by the client timeout; there is no retry.

use crate::domain::error::StockviewError;
use crate::domain::price::{PricePoint, Series};
use crate::ports::data_port::{DataPort, FetchMetadata, FetchResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Meta Data")]
    meta: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "1. Information")]
    information: Option<String>,
    #[serde(rename = "2. Symbol")]
    symbol: Option<String>,
    #[serde(rename = "3. Last Refreshed")]
    last_refreshed: Option<String>,
    #[serde(rename = "5. Time Zone")]
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

pub struct AlphaVantageAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageAdapter {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, StockviewError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockviewError::Upstream {
                symbol: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let api_key = match api_key {
            Some(key) => key.to_string(),
            None => {
                tracing::warn!("API_KEY is not set, using the rate-limited demo key");
                "demo".to_string()
            }
        };

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    fn parse_response(symbol: &str, resp: DailyResponse) -> Result<FetchResult, StockviewError> {
        if let Some(message) = resp.error_message {
            tracing::debug!(%symbol, %message, "upstream rejected symbol");
            return Err(StockviewError::NotFound {
                symbol: symbol.to_string(),
            });
        }

        let Some(rows) = resp.series else {
            let reason = resp
                .note
                .or(resp.information)
                .unwrap_or_else(|| "response has no daily time series".to_string());
            return Err(StockviewError::Upstream {
                symbol: symbol.to_string(),
                reason,
            });
        };

        let mut points = Vec::with_capacity(rows.len());
        for (key, bar) in rows {
            let date = NaiveDate::parse_from_str(&key, "%Y-%m-%d")
                .map_err(|e| StockviewError::data(format!("invalid date {key:?}: {e}")))?;
            let volume: f64 = parse_field(&key, "volume", &bar.volume)?;
            points.push(PricePoint {
                date,
                open: parse_field(&key, "open", &bar.open)?,
                high: parse_field(&key, "high", &bar.high)?,
                low: parse_field(&key, "low", &bar.low)?,
                close: parse_field(&key, "close", &bar.close)?,
                volume: volume as i64,
            });
        }

        let metadata = resp
            .meta
            .map(|m| FetchMetadata {
                information: m.information,
                symbol: m.symbol,
                last_refreshed: m.last_refreshed,
                time_zone: m.time_zone,
            })
            .unwrap_or_default();

        Ok(FetchResult {
            series: Series::new(symbol, points)?,
            metadata,
        })
    }
}

fn parse_field(date: &str, field: &str, raw: &str) -> Result<f64, StockviewError> {
    raw.trim()
        .parse()
        .map_err(|e| StockviewError::data(format!("invalid {field} {raw:?} on {date}: {e}")))
}

impl DataPort for AlphaVantageAdapter {
    fn fetch_daily(&self, symbol: &str) -> Result<FetchResult, StockviewError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    StockviewError::Timeout {
                        symbol: symbol.to_string(),
                    }
                } else {
                    StockviewError::Upstream {
                        symbol: symbol.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockviewError::Upstream {
                symbol: symbol.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body: DailyResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                StockviewError::Timeout {
                    symbol: symbol.to_string(),
                }
            } else {
                StockviewError::Upstream {
                    symbol: symbol.to_string(),
                    reason: format!("unexpected response body: {e}"),
                }
            }
        })?;

        Self::parse_response(symbol, body)
    }

    fn name(&self) -> &str {
        "alpha_vantage"
    }
}
