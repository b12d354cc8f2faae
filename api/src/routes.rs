use crate::error::ApiError;
use crate::state::AppState;
use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::Json;
use chrono::{NaiveDate, Utc};
use coinscope_rs::analysis::DashboardCharts;
use coinscope_rs::charts::Theme;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{date_interval, get_language, selected_language, Coin, DashboardTemplate, DateWindow, Screen, TextDict, View};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_SYMBOL: &str = "BTC";

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub lang: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub symbol: Option<String>,
    pub lang: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub theme: Option<String>,
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be YYYY-MM-DD, got {:?}", field, s))),
    }
}

/// Stock-price default window with the user's overrides applied
fn resolve_window(start: Option<&str>, end: Option<&str>) -> Result<DateWindow, ApiError> {
    let today = Utc::now().date_naive();
    let window = date_interval(Screen::StockPrice, View::Market, false, today)
        .with_overrides(parse_date("start", start)?, parse_date("end", end)?);
    if !window.is_valid() {
        return Err(ApiError::BadRequest(format!(
            "start {} is after end {}",
            window.start, window.end
        )));
    }
    Ok(window)
}

fn theme_name(theme: Option<&str>) -> &'static str {
    match theme {
        Some(t) if t.eq_ignore_ascii_case("dark") => "dark",
        _ => "light",
    }
}

fn text_for(state: &AppState, lang: Option<&str>) -> TextDict {
    selected_language(get_language(lang.or(Some(state.config.default_language.as_str()))))
}

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": env!("GIT_HASH"),
        "build_time": env!("BUILD_TIME"),
    }))
}

pub async fn coins(State(state): State<Arc<AppState>>) -> Json<Vec<Coin>> {
    Json(state.coins().await)
}

pub async fn text(Path(lang): Path<String>) -> Json<TextDict> {
    Json(selected_language(&lang))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Value>, ApiError> {
    let window = resolve_window(query.start.as_deref(), query.end.as_deref())?;
    let analysis = state.analysis(&symbol, window).await?;
    Ok(Json(json!({
        "ticker": analysis.ticker,
        "start": window.start,
        "end": window.end,
        "has_forecast": analysis.has_forecast(),
        "rows": analysis.rows,
    })))
}

pub async fn charts(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<DashboardCharts>, ApiError> {
    let window = resolve_window(query.start.as_deref(), query.end.as_deref())?;
    let text = text_for(&state, query.lang.as_deref());
    let theme = Theme::from_name(theme_name(query.theme.as_deref()));
    let analysis = state.analysis(&symbol, window).await?;
    Ok(Json(analysis.charts(&text.chart_text(), &theme, window.start, window.end)))
}

/// HTML dashboard; provider failures are shown on the page instead of
/// failing the request
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, ApiError> {
    let text = text_for(&state, query.lang.as_deref());
    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYMBOL)
        .to_ascii_uppercase();
    let theme = theme_name(query.theme.as_deref());
    let coins = state.coins().await;

    let (window, charts, error) = match resolve_window(query.start.as_deref(), query.end.as_deref()) {
        Ok(window) => match state.analysis(&symbol, window).await {
            Ok(analysis) => {
                let charts = analysis.charts(&text.chart_text(), &Theme::from_name(theme), window.start, window.end);
                (window, Some(charts), None)
            }
            Err(e) => {
                warn!("Dashboard for {} without charts: {}", symbol, e);
                (window, None, Some(e.to_string()))
            }
        },
        Err(e) => {
            let today = Utc::now().date_naive();
            (date_interval(Screen::StockPrice, View::Market, false, today), None, Some(e.to_string()))
        }
    };

    info!("Rendering dashboard for {} ({} to {}, {})", symbol, window.start, window.end, text.lang);
    let page = DashboardTemplate::new(text, coins, &symbol, window, theme, charts.as_ref(), error)
        .map_err(anyhow::Error::from)?;
    let html = page.render().map_err(anyhow::Error::from)?;
    Ok(Html(html))
}
