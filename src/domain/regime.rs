//! Price regime relative to the short and long moving averages.

use crate::domain::price::{DerivedColumn, Series};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    AboveBoth,
    BelowBoth,
    Mixed,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::AboveBoth => write!(f, "ABOVE_BOTH"),
            Regime::BelowBoth => write!(f, "BELOW_BOTH"),
            Regime::Mixed => write!(f, "MIXED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub regime: Regime,
}

/// Strict comparison against both averages; ties and undefined averages
/// are `Mixed`.
pub fn classify(close: f64, ma_short: Option<f64>, ma_long: Option<f64>) -> Regime {
    let (Some(short), Some(long)) = (ma_short, ma_long) else {
        return Regime::Mixed;
    };

    if close > short && close > long {
        Regime::AboveBoth
    } else if close < short && close < long {
        Regime::BelowBoth
    } else {
        Regime::Mixed
    }
}

/// Classify every point of an enriched series, returned oldest-first.
///
/// Only the most recent `lookback` chronological points are kept. A series
/// without derived columns classifies as all `Mixed`.
pub fn classify_series(series: &Series, lookback: usize) -> Vec<RegimePoint> {
    let take = lookback.min(series.len());
    let ma_at = |col: &Option<DerivedColumn>, i: usize| {
        col.as_ref().and_then(|c| c.get(i))
    };

    // Newest-first index i maps to chronological position len-1-i.
    let mut points: Vec<RegimePoint> = series
        .points()
        .iter()
        .enumerate()
        .take(take)
        .map(|(i, p)| {
            let ma_short = ma_at(&series.ma_short, i);
            let ma_long = ma_at(&series.ma_long, i);
            RegimePoint {
                date: p.date,
                close: p.close,
                ma_short,
                ma_long,
                regime: classify(p.close, ma_short, ma_long),
            }
        })
        .collect();
    points.reverse();
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::with_moving_averages;
    use crate::domain::price::PricePoint;
    use proptest::prelude::*;

    #[test]
    fn above_both() {
        assert_eq!(classify(110.0, Some(100.0), Some(105.0)), Regime::AboveBoth);
    }

    #[test]
    fn below_both() {
        assert_eq!(classify(90.0, Some(100.0), Some(95.0)), Regime::BelowBoth);
    }

    #[test]
    fn between_averages_is_mixed() {
        assert_eq!(classify(100.0, Some(95.0), Some(105.0)), Regime::Mixed);
    }

    #[test]
    fn ties_are_mixed() {
        assert_eq!(classify(100.0, Some(100.0), Some(90.0)), Regime::Mixed);
        assert_eq!(classify(100.0, Some(110.0), Some(100.0)), Regime::Mixed);
        assert_eq!(classify(100.0, Some(100.0), Some(100.0)), Regime::Mixed);
    }

    #[test]
    fn undefined_average_is_mixed() {
        assert_eq!(classify(100.0, None, Some(90.0)), Regime::Mixed);
        assert_eq!(classify(100.0, Some(90.0), None), Regime::Mixed);
        assert_eq!(classify(100.0, None, None), Regime::Mixed);
    }

    #[test]
    fn regime_display() {
        assert_eq!(Regime::AboveBoth.to_string(), "ABOVE_BOTH");
        assert_eq!(Regime::BelowBoth.to_string(), "BELOW_BOTH");
        assert_eq!(Regime::Mixed.to_string(), "MIXED");
    }

    fn rising_series(n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| PricePoint::flat(start + chrono::Duration::days(i as i64), 100.0 + i as f64))
            .collect();
        Series::new("UP", points).unwrap()
    }

    #[test]
    fn classify_series_is_chronological_and_bounded() {
        let series = with_moving_averages(rising_series(10), 2, 3);
        let points = classify_series(&series, 4);

        assert_eq!(points.len(), 4);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(points.last().unwrap().date, series.latest().unwrap().date);
        // rising prices sit above both trailing averages
        assert!(points.iter().all(|p| p.regime == Regime::AboveBoth));
    }

    #[test]
    fn classify_series_warmup_is_mixed() {
        let series = with_moving_averages(rising_series(5), 2, 3);
        let points = classify_series(&series, 730);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].regime, Regime::Mixed);
        assert_eq!(points[1].regime, Regime::Mixed);
        assert!(points[0].ma_long.is_none());
        assert_eq!(points[2].regime, Regime::AboveBoth);
    }

    #[test]
    fn classify_series_without_indicators() {
        let points = classify_series(&rising_series(3), 10);
        assert!(points.iter().all(|p| p.regime == Regime::Mixed));
    }

    proptest! {
        #[test]
        fn classify_is_tie_safe(close in -1e6f64..1e6, other in -1e6f64..1e6) {
            prop_assert_eq!(classify(close, Some(close), Some(other)), Regime::Mixed);
            prop_assert_eq!(classify(close, Some(other), Some(close)), Regime::Mixed);
        }

        #[test]
        fn classify_agrees_with_definition(
            close in -1e3f64..1e3,
            short in -1e3f64..1e3,
            long in -1e3f64..1e3,
        ) {
            let regime = classify(close, Some(short), Some(long));
            let expected = if close > short && close > long {
                Regime::AboveBoth
            } else if close < short && close < long {
                Regime::BelowBoth
            } else {
                Regime::Mixed
            };
            prop_assert_eq!(regime, expected);
        }
    }
}
