#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Search form and redirect
//! - Stock page with table and chart
//! - Not-found page for unknown symbols
//! - JSON endpoint in split encoding and its error bodies
//! - Chart image served from the images directory
//! - Prometheus counters for requests, cache and upstream outcomes

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use stockview::adapters::memory_cache_adapter::MemoryCacheAdapter;
use stockview::adapters::svg_chart::SvgChartAdapter;
use stockview::adapters::web::{build_router, AppState};
use stockview::domain::config::ServiceSettings;
use stockview::domain::error::StockviewError;
use stockview::domain::frame::SplitFrame;
use stockview::domain::series_service::SeriesService;
use stockview::ports::chart_port::ChartPort;
use tower::ServiceExt;

use common::*;

fn settings() -> ServiceSettings {
    ServiceSettings {
        short_window: 3,
        long_window: 5,
        plot_lookback: 20,
        ..ServiceSettings::default()
    }
}

fn create_test_app_with_chart(
    chart: Arc<dyn ChartPort + Send + Sync>,
    images_dir: &std::path::Path,
) -> Router {
    let data = MockDataPort::new()
        .with_points("AAPL", generate_points("2024-01-01", 30, 100.0))
        .with_error(
            "BUSY",
            StockviewError::Upstream {
                symbol: "BUSY".into(),
                reason: "rate limited".into(),
            },
        )
        .with_error("BROKEN", StockviewError::data("no close column"));
    let service = SeriesService::new(
        Arc::new(data),
        Arc::new(MemoryCacheAdapter::new()),
        chart,
        settings(),
    );
    build_router(AppState::new(Arc::new(service), images_dir.to_path_buf()))
}

fn create_test_app(images_dir: &std::path::Path) -> Router {
    let chart = Arc::new(SvgChartAdapter::new(images_dir.to_path_buf()));
    create_test_app_with_chart(chart, images_dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

mod page_tests {
    use super::*;

    #[tokio::test]
    async fn index_renders_search_form() {
        let dir = tempfile::tempdir().unwrap();
        let (status, html) = get(create_test_app(dir.path()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("name=\"symbol\""));
        assert!(html.contains("method=\"post\""));
    }

    #[tokio::test]
    async fn search_redirects_to_stock_page() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_test_app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("symbol=aapl"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/stock/AAPL");
    }

    #[tokio::test]
    async fn blank_search_redirects_home() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_test_app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("symbol=+"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn stock_page_shows_table_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let (status, html) = get(create_test_app(dir.path()), "/stock/aapl").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Stock Data for AAPL"));
        assert!(html.contains("3-Day MA"));
        assert!(html.contains("5-Day MA"));
        assert!(html.contains("<td>129.00</td>"));
        assert!(html.contains("/static/images/AAPL.svg"));
        assert!(dir.path().join("AAPL.svg").exists());
    }

    #[tokio::test]
    async fn chart_failure_still_renders_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app_with_chart(Arc::new(RecordingChart::failing()), dir.path());
        let (status, html) = get(app, "/stock/AAPL").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Stock Data for AAPL"));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn unknown_symbol_renders_not_found_page() {
        let dir = tempfile::tempdir().unwrap();
        let (status, html) = get(create_test_app(dir.path()), "/stock/FAKESYMBOL").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Stock symbol 'FAKESYMBOL' not found"));
    }

    #[tokio::test]
    async fn upstream_failure_renders_not_found_page() {
        let dir = tempfile::tempdir().unwrap();
        let (status, html) = get(create_test_app(dir.path()), "/stock/BUSY").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Stock symbol 'BUSY' not found"));
    }

    #[tokio::test]
    async fn rendered_chart_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(dir.path());

        let (status, _) = get(app.clone(), "/stock/AAPL").await;
        assert_eq!(status, StatusCode::OK);

        let (status, svg) = get(app, "/static/images/AAPL.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("AAPL Closing Price and Moving Averages"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (status, html) = get(create_test_app(dir.path()), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Page not found"));
    }
}

mod api_tests {
    use super::*;

    #[tokio::test]
    async fn api_returns_split_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(create_test_app(dir.path()), "/api/stock/AAPL").await;

        assert_eq!(status, StatusCode::OK);
        let frame: SplitFrame = serde_json::from_str(&body).unwrap();
        assert_eq!(
            frame.columns,
            vec!["1. open", "2. high", "3. low", "4. close", "5. volume", "3-Day MA", "5-Day MA"]
        );
        assert_eq!(frame.index.len(), 30);
        assert_eq!(frame.index[0], "2024-01-30");
        assert_eq!(frame.data[0][3], Some(129.0));
        assert_eq!(frame.data[0][5], Some(128.0));
        assert_eq!(frame.data[29][6], None);
    }

    #[tokio::test]
    async fn api_unknown_symbol_is_404_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(create_test_app(dir.path()), "/api/stock/FAKESYMBOL").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Data not found for symbol FAKESYMBOL");
    }

    #[tokio::test]
    async fn api_data_error_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(create_test_app(dir.path()), "/api/stock/BROKEN").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("no close column"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(create_test_app(dir.path()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}

mod metrics_tests {
    use super::*;

    #[tokio::test]
    async fn metrics_count_requests_and_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(dir.path());

        assert_eq!(get(app.clone(), "/api/stock/AAPL").await.0, StatusCode::OK);
        assert_eq!(get(app.clone(), "/api/stock/aapl").await.0, StatusCode::OK);
        assert_eq!(get(app.clone(), "/stock/FAKESYMBOL").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(app.clone(), "/api/stock/BUSY").await.0, StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);

        assert!(text.contains("stockview_http_requests_total{method=\"GET\",status=\"200\"} 2\n"));
        assert!(text.contains("stockview_http_requests_total{method=\"GET\",status=\"404\"} 2\n"));
        assert!(text.contains("stockview_cache_hits_total 1\n"));
        assert!(text.contains("stockview_cache_misses_total 3\n"));
        assert!(text.contains("stockview_upstream_fetches_total 1\n"));
        assert!(text.contains("stockview_upstream_not_found_total 1\n"));
        assert!(text.contains("stockview_upstream_errors_total 1\n"));
        assert!(text.contains("stockview_upstream_timeouts_total 0\n"));
    }
}

mod symbol_guard_tests {
    use super::*;

    #[tokio::test]
    async fn encoded_path_segments_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(create_test_app(dir.path()), "/api/stock/..%2F..%2Fx").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().starts_with("Data not found for symbol"));
    }

    #[tokio::test]
    async fn encoded_path_segments_render_not_found_page() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = get(create_test_app(dir.path()), "/stock/..%2Fsecret").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
