//! Counters for cache and upstream outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ServiceMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_errors: AtomicU64,
    upstream_fetches: AtomicU64,
    upstream_not_found: AtomicU64,
    upstream_timeouts: AtomicU64,
    upstream_errors: AtomicU64,
    data_errors: AtomicU64,
}

/// Point-in-time copy of [`ServiceMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_errors: u64,
    pub upstream_fetches: u64,
    pub upstream_not_found: u64,
    pub upstream_timeouts: u64,
    pub upstream_errors: u64,
    pub data_errors: u64,
}

impl MetricsSnapshot {
    /// `(name, help, value)` for each counter, in export order.
    pub fn counters(&self) -> [(&'static str, &'static str, u64); 8] {
        [
            ("cache_hits_total", "Series served from the cache", self.cache_hits),
            ("cache_misses_total", "Lookups that found no fresh entry", self.cache_misses),
            ("cache_errors_total", "Cache operations that failed", self.cache_errors),
            ("upstream_fetches_total", "Successful upstream fetches", self.upstream_fetches),
            ("upstream_not_found_total", "Symbols the upstream does not know", self.upstream_not_found),
            ("upstream_timeouts_total", "Upstream fetches that timed out", self.upstream_timeouts),
            ("upstream_errors_total", "Other upstream failures", self.upstream_errors),
            ("data_errors_total", "Malformed or empty upstream series", self.data_errors),
        ]
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ServiceMetrics {
    pub fn cache_hit(&self) {
        bump(&self.cache_hits);
    }

    pub fn cache_miss(&self) {
        bump(&self.cache_misses);
    }

    pub fn cache_error(&self) {
        bump(&self.cache_errors);
    }

    pub fn upstream_fetch(&self) {
        bump(&self.upstream_fetches);
    }

    pub fn upstream_not_found(&self) {
        bump(&self.upstream_not_found);
    }

    pub fn upstream_timeout(&self) {
        bump(&self.upstream_timeouts);
    }

    pub fn upstream_error(&self) {
        bump(&self.upstream_errors);
    }

    pub fn data_error(&self) {
        bump(&self.data_errors);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
            cache_errors: load(&self.cache_errors),
            upstream_fetches: load(&self.upstream_fetches),
            upstream_not_found: load(&self.upstream_not_found),
            upstream_timeouts: load(&self.upstream_timeouts),
            upstream_errors: load(&self.upstream_errors),
            data_errors: load(&self.data_errors),
        }
    }
}
