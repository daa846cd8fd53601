//! Simple moving average.
//!
//! O(n) sliding window. SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n over
//! oldest-first closes. Warmup: the first (n-1) chronological values are
//! undefined, which puts them at the tail of a newest-first series.

use crate::domain::indicator::to_native_order;
use crate::domain::price::{DerivedColumn, Series};

/// Rolling mean of oldest-first `closes`. A zero window yields no values.
pub fn rolling_mean_chronological(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut window_sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= window {
            window_sum -= closes[i - window];
        }

        if i + 1 >= window {
            values.push(Some(window_sum / window as f64));
        } else {
            values.push(None);
        }
    }

    values
}

/// Rolling mean of a series' closes, aligned with its newest-first points.
pub fn rolling_mean(series: &Series, window: usize) -> DerivedColumn {
    let closes: Vec<f64> = series.chronological().map(|p| p.close).collect();
    to_native_order(rolling_mean_chronological(&closes, window), window)
}
