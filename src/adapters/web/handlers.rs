//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::domain::error::StockviewError;
use crate::domain::frame::SplitFrame;
use crate::domain::price::{normalize_symbol, Series};
use crate::ports::chart_port::ChartArtifact;

use super::templates::{
    latest_summary, table_rows, IndexTemplate, NotFoundTemplate, StockTemplate,
};
use super::{status_from_error, AppState, WebError};

pub async fn index() -> Result<Response, WebError> {
    Ok(Html(IndexTemplate.render()?).into_response())
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub symbol: String,
}

pub async fn search(Form(form): Form<SearchForm>) -> Redirect {
    let symbol = sanitize_symbol(&form.symbol);
    if symbol.is_empty() {
        return Redirect::to("/");
    }
    Redirect::to(&format!("/stock/{symbol}"))
}

/// Keep only characters that occur in ticker symbols.
fn sanitize_symbol(raw: &str) -> String {
    normalize_symbol(raw)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        .collect()
}

pub async fn stock_page(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Response, WebError> {
    let service = Arc::clone(&state.service);
    let lookup = symbol.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<_, StockviewError> {
        let series = service.get_series(&lookup)?;
        let chart = match service.render_series(&series) {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                tracing::warn!(symbol = %series.symbol, error = %err, "chart rendering failed");
                None
            }
        };
        Ok((series, chart))
    })
    .await
    .map_err(|e| WebError::internal(format!("worker task failed: {e}")))?;

    match result {
        Ok((series, chart)) => render_stock(&series, chart.as_ref()),
        Err(err) if err.is_absence() => {
            let html = NotFoundTemplate { symbol: &symbol }.render()?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

fn render_stock(series: &Series, chart: Option<&ChartArtifact>) -> Result<Response, WebError> {
    let frame = SplitFrame::from_series(series);
    let rows = table_rows(&frame);
    let template = StockTemplate {
        symbol: &series.symbol,
        plot_url: chart.map(|c| c.url.as_str()),
        latest: latest_summary(series),
        columns: &frame.columns,
        rows: &rows,
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn api_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Response {
    let service = Arc::clone(&state.service);
    let lookup = symbol.clone();
    let result = match tokio::task::spawn_blocking(move || service.get_series(&lookup)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(%symbol, "worker task failed: {e}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string());
        }
    };

    match result {
        Ok(series) => Json(SplitFrame::from_series(&series)).into_response(),
        Err(err) if err.is_absence() => json_error(
            StatusCode::NOT_FOUND,
            format!("Data not found for symbol {symbol}"),
        ),
        Err(err) => {
            let status = status_from_error(&err);
            tracing::error!(%symbol, error = %err, "api request failed");
            json_error(status, err.to_string())
        }
    }
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
