use api::{router, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use coinscope_rs::data::{Candle, CandleSeries};
use serde_json::Value;
use shared::market_data::fallback_coins;
use shared::{Coin, Config, MarketDataError, MarketDataSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Canned market data: a gently trending wave for any symbol except the
/// two that simulate provider failures
#[derive(Default)]
struct FakeSource {
    history_calls: AtomicUsize,
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn coin_universe(&self) -> Result<Vec<Coin>, MarketDataError> {
        Ok(vec![Coin::new("Bitcoin", "BTC"), Coin::new("Ethereum", "ETH")])
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<CandleSeries, MarketDataError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let ticker = format!("{}-USD", symbol.to_ascii_uppercase());
        match symbol.to_ascii_uppercase().as_str() {
            "NOPE" => return Err(MarketDataError::NoData(ticker)),
            "DOWN" => {
                return Err(MarketDataError::Provider {
                    code: "Internal Server Error".to_string(),
                    description: "try later".to_string(),
                })
            }
            _ => {}
        }

        let end = end.unwrap_or(start);
        let candles = start
            .iter_days()
            .take_while(|d| *d <= end)
            .enumerate()
            .map(|(i, date)| {
                let close = 100.0 + i as f64 * 0.5 + 10.0 * (i as f64 / 20.0).sin();
                let timestamp = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap());
                Candle::new(close * 0.995, close * 1.02, close * 0.98, close, 1_000.0, timestamp, &ticker)
            })
            .collect();
        Ok(CandleSeries::from_vec(candles))
    }
}

/// Provider that is down for everything
struct FailingSource;

#[async_trait]
impl MarketDataSource for FailingSource {
    async fn coin_universe(&self) -> Result<Vec<Coin>, MarketDataError> {
        Err(MarketDataError::Provider {
            code: "503 Service Unavailable".to_string(),
            description: "maintenance".to_string(),
        })
    }

    async fn daily_history(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: Option<NaiveDate>,
    ) -> Result<CandleSeries, MarketDataError> {
        Err(MarketDataError::NoData(symbol.to_string()))
    }
}

fn app() -> (Router, Arc<FakeSource>) {
    let source = Arc::new(FakeSource::default());
    let state = AppState::new(Config::default(), source.clone(), None);
    (router(Arc::new(state)), source)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn test_coins_and_text() {
    let (app, _) = app();

    let (status, coins) = get_json(&app, "/api/coins").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(coins[0]["symbol"], "BTC");
    assert_eq!(coins.as_array().unwrap().len(), 2);

    let (_, pt) = get_json(&app, "/api/text/pt").await;
    assert_eq!(pt["date_filters"][0], "Data Inicial");
    let (_, fallback) = get_json(&app, "/api/text/de").await;
    assert_eq!(fallback["lang"], "en");
}

#[tokio::test]
async fn test_coins_fall_back_when_provider_fails() {
    let state = AppState::new(Config::default(), Arc::new(FailingSource), None);
    let app = router(Arc::new(state));

    let (status, coins) = get_json(&app, "/api/coins").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(coins, serde_json::to_value(fallback_coins()).unwrap());

    let (status, body) = get(&app, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains(r#"value="DOGE""#));
}

#[tokio::test]
async fn test_history_is_enriched_and_cached() {
    let (app, source) = app();
    let uri = "/api/history/btc?start=2021-01-01&end=2023-12-31";

    let (status, body) = get_json(&app, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "BTC-USD");
    assert_eq!(body["has_forecast"], true);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1095);
    assert!(rows[0]["rsi"].is_null());
    assert!(rows[100]["rsi"].is_number());
    assert!(rows[100]["senkou_span_b"].is_number());

    // same window again is served from the cache
    let _ = get_json(&app, "/api/charts/BTC?start=2021-01-01&end=2023-12-31&lang=pt").await;
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_window_cache_is_bounded() {
    let source = Arc::new(FakeSource::default());
    let config = Config {
        cache_max_entries: 2,
        ..Config::default()
    };
    let app = router(Arc::new(AppState::new(config, source.clone(), None)));

    for end in ["2023-10-01", "2023-10-02", "2023-10-03"] {
        let (status, _) = get_json(&app, &format!("/api/history/btc?start=2023-01-01&end={}", end)).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 3);

    // the first window was evicted, the last one is still cached
    let _ = get_json(&app, "/api/history/btc?start=2023-01-01&end=2023-10-03").await;
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 3);
    let _ = get_json(&app, "/api/history/btc?start=2023-01-01&end=2023-10-01").await;
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_charts_are_localized() {
    let (app, _) = app();
    let (status, body) = get_json(&app, "/api/charts/eth?start=2021-01-01&end=2023-12-31&lang=pt&theme=dark").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_forecast"], true);
    assert_eq!(body["close_price"]["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["close_price"]["data"][2]["name"], "Mercado");
    assert_eq!(body["ichimoku"]["layout"]["paper_bgcolor"], "#0e1117");
    assert_eq!(body["qoq"]["data"][0]["type"], "bar");
}

#[tokio::test]
async fn test_short_history_falls_back_to_market_line() {
    let (app, _) = app();
    let (status, body) = get_json(&app, "/api/charts/btc?start=2023-09-01&end=2023-12-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_forecast"], false);
    let traces = body["close_price"]["data"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["name"], "Market");
}

#[tokio::test]
async fn test_error_statuses() {
    let (app, _) = app();

    let (status, body) = get_json(&app, "/api/history/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("NOPE-USD"));

    let (status, _) = get_json(&app, "/api/history/down").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = get_json(&app, "/api/history/b%2Fc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app, "/api/history/btc?start=2024-05-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get_json(&app, "/api/charts/btc?start=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_renders() {
    let (app, _) = app();
    let (status, body) = get(&app, "/dashboard?symbol=eth&lang=pt&start=2021-01-01&end=2023-12-31").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Data Inicial"));
    assert!(html.contains(r#"value="ETH" selected"#));
    assert!(html.contains("Plotly.newPlot"));
    assert!(!html.contains("Adicione pelo menos um ano de dados"));
}

#[tokio::test]
async fn test_dashboard_shows_provider_errors() {
    let (app, _) = app();
    let (status, body) = get(&app, "/dashboard?symbol=nope").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("NOPE-USD"));
    // no charts, so no advice about forecast length either
    assert!(!html.contains("Add at least one year of data"));
}

#[tokio::test]
async fn test_dashboard_hints_at_short_windows() {
    let (app, _) = app();
    let (status, body) = get(&app, "/dashboard?symbol=btc&start=2023-09-01&end=2023-12-31").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Add at least one year of data"));
}
