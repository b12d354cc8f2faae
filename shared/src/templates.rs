use crate::dates::DateWindow;
use crate::i18n::{TextDict, LANGUAGES};
use crate::market_data::Coin;
use askama::Template;
use chrono::Utc;
use coinscope_rs::analysis::DashboardCharts;

/// Serialize for embedding inside a `<script>` block
pub fn script_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Language pill shown in the header
#[derive(Debug, Clone)]
pub struct LanguageLink {
    pub code: &'static str,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html.jinja", escape = "html")]
pub struct DashboardTemplate {
    pub text: TextDict,
    pub languages: Vec<LanguageLink>,
    pub coins: Vec<Coin>,
    pub symbol: String,
    pub start: String,
    pub end: String,
    pub theme: String,
    pub has_charts: bool,
    pub has_forecast: bool,
    /// Figures as JSON, `null` when nothing could be computed
    pub charts_json: String,
    pub error: Option<String>,
    pub created_at: String,
    pub version: &'static str,
}

impl DashboardTemplate {
    pub fn new(
        text: TextDict,
        coins: Vec<Coin>,
        symbol: &str,
        window: DateWindow,
        theme: &str,
        charts: Option<&DashboardCharts>,
        error: Option<String>,
    ) -> Result<Self, serde_json::Error> {
        let languages = LANGUAGES
            .iter()
            .map(|&code| LanguageLink {
                code,
                active: code == text.lang,
            })
            .collect();

        Ok(Self {
            languages,
            coins,
            symbol: symbol.to_ascii_uppercase(),
            start: window.start.format("%Y-%m-%d").to_string(),
            end: window.end.format("%Y-%m-%d").to_string(),
            theme: theme.to_string(),
            has_charts: charts.is_some(),
            has_forecast: charts.map_or(false, |c| c.has_forecast),
            charts_json: script_json(&charts)?,
            error,
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            version: env!("CARGO_PKG_VERSION"),
            text,
        })
    }
}
