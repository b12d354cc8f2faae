//! Daily OHLCV history from the Yahoo Finance chart API

use crate::error::MarketDataError;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use coinscope_rs::data::{Candle, CandleSeries};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Daily candles of `ticker` from `start` through `end` (today when `None`)
    pub async fn daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<CandleSeries, MarketDataError> {
        let url = format!("{}/{}", self.base_url, ticker);
        let end = end.unwrap_or_else(|| Utc::now().date_naive());
        let (period1, period2) = period_bounds(start, end);
        debug!("Fetching {} from {} to {}", ticker, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::http(&url, e))?;

        // Yahoo answers unknown tickers with a 404; anything else that is
        // not a success is the provider failing, not a missing coin
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Yahoo has no chart for {}", ticker);
            return Err(MarketDataError::NoData(ticker.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Yahoo returned {} for {}", status, ticker);
            return Err(MarketDataError::Provider {
                code: status.to_string(),
                description: error_description(&text),
            });
        }
        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::http(&url, e))?;

        let series = parse_chart(body, ticker)?.between(start, end);
        if series.is_empty() {
            return Err(MarketDataError::NoData(ticker.to_string()));
        }
        Ok(series)
    }
}

/// Yahoo's own error description when the body carries one, otherwise the
/// start of the raw body
fn error_description(body: &str) -> String {
    if let Ok(ChartResponse {
        chart: ChartResult { error: Some(error), .. },
    }) = serde_json::from_str::<ChartResponse>(body)
    {
        return error.description;
    }
    body.trim().chars().take(200).collect()
}

/// Unix seconds covering `start` through the whole of `end`
fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let seconds = |date: NaiveDate| {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    };
    let after_end = end.checked_add_days(Days::new(1)).unwrap_or(end);
    (seconds(start), seconds(after_end))
}

/// Turn a chart response into candles; days with any missing OHLC value are
/// skipped and a missing volume counts as zero
pub fn parse_chart(response: ChartResponse, ticker: &str) -> Result<CandleSeries, MarketDataError> {
    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(MarketDataError::NoData(ticker.to_string()));
        }
        return Err(MarketDataError::Provider {
            code: error.code,
            description: error.description,
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(MarketDataError::NoData(ticker.to_string()));
    };
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten().filter(|v| v.is_finite());

    let candles = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
            Some(Candle::new(
                at(&quote.open, i)?,
                at(&quote.high, i)?,
                at(&quote.low, i)?,
                at(&quote.close, i)?,
                at(&quote.volume, i).unwrap_or(0.0),
                timestamp,
                ticker,
            ))
        })
        .collect::<Vec<_>>();

    if candles.len() < timestamps.len() {
        debug!("Dropped {} incomplete rows for {}", timestamps.len() - candles.len(), ticker);
    }
    Ok(CandleSeries::from_vec(candles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::test_server::{serve, test_client};

    fn response(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_chart_skips_incomplete_rows() {
        let body = response(
            r#"{"chart": {"result": [{
                "meta": {"symbol": "BTC-USD"},
                "timestamp": [1704153600, 1704067200, 1704240000],
                "indicators": {"quote": [{
                    "open":   [44000.0, 42000.0, null],
                    "high":   [45000.0, 44200.0, 46000.0],
                    "low":    [43500.0, 41900.0, 44000.0],
                    "close":  [44900.0, 44100.0, 45500.0],
                    "volume": [null, 1000000.0, 2000000.0]
                }]}
            }], "error": null}}"#,
        );

        let series = parse_chart(body, "BTC-USD").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), Some("BTC-USD"));
        // sorted by time
        assert_eq!(series.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series.closes(), vec![44100.0, 44900.0]);
        assert_eq!(series.get(1).unwrap().volume, 0.0);
    }

    #[test]
    fn test_parse_chart_error_payload() {
        let body = response(
            r#"{"chart": {"result": null, "error": {"code": "Bad Request", "description": "Invalid input"}}}"#,
        );
        match parse_chart(body, "BTC-USD") {
            Err(MarketDataError::Provider { code, .. }) => assert_eq!(code, "Bad Request"),
            other => panic!("unexpected {:?}", other),
        }

        let body = response(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        );
        assert!(matches!(parse_chart(body, "NOPE-USD"), Err(MarketDataError::NoData(_))));
    }

    #[test]
    fn test_error_description() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Too Many Requests", "description": "slow down"}}}"#;
        assert_eq!(error_description(json), "slow down");
        assert_eq!(error_description("  <html>busy</html>\n"), "<html>busy</html>");
        assert_eq!(error_description(&"x".repeat(500)).len(), 200);
    }

    async fn fetch(status_line: &'static str, body: &'static str) -> Result<CandleSeries, MarketDataError> {
        let base_url = serve(status_line, body).await;
        let client = YahooClient::new(test_client(), &base_url);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        client.daily_history("BTC-USD", start, Some(start)).await
    }

    #[tokio::test]
    async fn test_rate_limit_is_a_provider_error() {
        match fetch("429 Too Many Requests", "Too Many Requests").await {
            Err(MarketDataError::Provider { code, description }) => {
                assert_eq!(code, "429 Too Many Requests");
                assert_eq!(description, "Too Many Requests");
            }
            other => panic!("unexpected {:?}", other),
        }

        let html = fetch("503 Service Unavailable", "<html>maintenance</html>").await;
        assert!(matches!(html, Err(MarketDataError::Provider { code, .. }) if code.starts_with("503")));
    }

    #[tokio::test]
    async fn test_not_found_status_means_no_data() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        assert!(matches!(fetch("404 Not Found", body).await, Err(MarketDataError::NoData(t)) if t == "BTC-USD"));
        assert!(matches!(fetch("404 Not Found", "gone").await, Err(MarketDataError::NoData(_))));
    }

    #[tokio::test]
    async fn test_success_with_garbage_body_is_http_error() {
        assert!(matches!(fetch("200 OK", "not json").await, Err(MarketDataError::Http { .. })));
    }

    #[tokio::test]
    async fn test_daily_history_over_http() {
        let body = r#"{"chart": {"result": [{
            "timestamp": [1704067200],
            "indicators": {"quote": [{"open": [1.0], "high": [2.0], "low": [0.5], "close": [1.5], "volume": [10.0]}]}
        }], "error": null}}"#;
        let series = fetch("200 OK", body).await.unwrap();
        assert_eq!(series.closes(), vec![1.5]);
    }

    #[test]
    fn test_period_bounds_cover_end_day() {
        let (p1, p2) = period_bounds(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert_eq!(p1, 1704067200);
        assert_eq!(p2, 1704240000);
    }
}
