//! Prometheus text exposition for request and service counters.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::AppState;
use crate::domain::metrics::MetricsSnapshot;

const PREFIX: &str = "stockview";

/// Request counts keyed by method and status code.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    counts: Mutex<BTreeMap<(String, u16), u64>>,
}

impl RequestMetrics {
    pub fn record(&self, method: &str, status: u16) {
        match self.counts.lock() {
            Ok(mut counts) => *counts.entry((method.to_string(), status)).or_insert(0) += 1,
            Err(_) => tracing::warn!("request metrics lock poisoned"),
        }
    }

    pub fn snapshot(&self) -> Vec<((String, u16), u64)> {
        self.counts
            .lock()
            .map(|counts| counts.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default()
    }
}

pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let response = next.run(request).await;
    state.requests.record(&method, response.status().as_u16());
    response
}

pub async fn prometheus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = render(&state.requests.snapshot(), &state.service.metrics());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

fn render(requests: &[((String, u16), u64)], service: &MetricsSnapshot) -> String {
    let mut out = String::new();

    let name = format!("{PREFIX}_http_requests_total");
    out.push_str(&format!("# HELP {name} HTTP requests by method and status\n"));
    out.push_str(&format!("# TYPE {name} counter\n"));
    for ((method, status), count) in requests {
        out.push_str(&prom_line(
            &name,
            &[("method", method), ("status", &status.to_string())],
            *count,
        ));
    }

    for (counter, help, value) in service.counters() {
        let name = format!("{PREFIX}_{counter}");
        out.push_str(&format!("# HELP {name} {help}\n"));
        out.push_str(&format!("# TYPE {name} counter\n"));
        out.push_str(&prom_line(&name, &[], value));
    }
    out
}

fn prom_line(name: &str, labels: &[(&str, &str)], value: u64) -> String {
    if labels.is_empty() {
        return format!("{name} {value}\n");
    }
    let labels: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect();
    format!("{name}{{{}}} {value}\n", labels.join(","))
}
