//! Trailing indicators over a [`Series`].
//!
//! Every calculation here is defined on oldest-first data. Callers hand in a
//! newest-first series; the helpers reverse, compute and reverse back so the
//! result lines up index-for-index with [`Series::points`].

pub mod sma;

use crate::domain::price::{DerivedColumn, Series};

pub use sma::{rolling_mean, rolling_mean_chronological};

/// Attach the short and long moving averages to `series`.
pub fn with_moving_averages(series: Series, short_window: usize, long_window: usize) -> Series {
    let ma_short = rolling_mean(&series, short_window);
    let ma_long = rolling_mean(&series, long_window);
    series.with_indicators(ma_short, ma_long)
}

/// Re-express an oldest-first column in newest-first order.
pub(crate) fn to_native_order(chronological: Vec<Option<f64>>, window: usize) -> DerivedColumn {
    let mut values = chronological;
    values.reverse();
    DerivedColumn { window, values }
}
