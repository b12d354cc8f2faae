//! i18n module for the dashboard's English and Portuguese labels

use coinscope_rs::charts::ChartText;
use serde::Serialize;

/// Languages offered by the language pills
pub const LANGUAGES: [&str; 2] = ["en", "pt"];

/// Every piece of text the dashboard shows, in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDict {
    pub lang: &'static str,
    pub top_menu: [&'static str; 2],
    pub market_menu: &'static str,
    pub stock_options: &'static str,
    /// Start date, end date
    pub date_filters: [&'static str; 2],
    /// Net income, close price
    pub headers: [&'static str; 2],
    /// Mean, projection, market, quarter projection
    pub close_price_plot: [&'static str; 4],
    pub ticket: &'static str,
    pub buy_month: &'static str,
    pub sell_month: &'static str,
    pub price_range: &'static str,
    pub confidence: &'static str,
    pub quarter_graph_title: &'static str,
    pub rsi_title: &'static str,
    /// Shown when the price chart falls back to no projection
    pub forecast: &'static str,
    pub ichimoku_title: &'static str,
    pub close_price: &'static str,
    pub conversion_line: &'static str,
    pub base_line: &'static str,
    pub span_a: &'static str,
    pub span_b: &'static str,
    pub cloud_bullish: &'static str,
    pub cloud_bearish: &'static str,
    pub translate: &'static str,
    pub crypto: &'static str,
    pub apply: &'static str,
}

const EN: TextDict = TextDict {
    lang: "en",
    top_menu: ["Market", "Seasonality"],
    market_menu: "Market",
    stock_options: "Stocks",
    date_filters: ["Start Date", "End Date"],
    headers: ["Net Income", "Close Price"],
    close_price_plot: ["Mean", "Projection", "Market", "Quarter Projection"],
    ticket: "Asset",
    buy_month: "Buy Month",
    sell_month: "Sell Month",
    price_range: "Price Range",
    confidence: "Seasonality",
    quarter_graph_title: "Grow QoQ",
    rsi_title: "RSI 5 days",
    forecast: "Add at least one year of data",
    ichimoku_title: "Ichimoku Cloud",
    close_price: "Close Price",
    conversion_line: "Conversion Line",
    base_line: "Base Line",
    span_a: "Senkou Span A",
    span_b: "Senkou Span B",
    cloud_bullish: "Cloud (Bullish)",
    cloud_bearish: "Cloud (Bearish)",
    translate: "Translate",
    crypto: "Crypto",
    apply: "Apply",
};

const PT: TextDict = TextDict {
    lang: "pt",
    top_menu: ["Mercado", "Sazonalidade"],
    market_menu: "Mercado",
    stock_options: "Ações",
    date_filters: ["Data Inicial", "Data Final"],
    headers: ["Lucros", "Preço de Fechamento"],
    close_price_plot: ["Média", "Projeção", "Mercado", "Projeção Trimestral"],
    ticket: "Ativo",
    buy_month: "Mês Compra",
    sell_month: "Mês Venda",
    price_range: "Variação Preço",
    confidence: "Sazonalidade",
    quarter_graph_title: "Crescimento Trimestral (TsT)",
    rsi_title: "Índice de Peso Relativo (RSI 5 dias)",
    forecast: "Adicione pelo menos um ano de dados",
    ichimoku_title: "Nuvem de Ichimoku",
    close_price: "Preço de Fechamento",
    conversion_line: "Linha de Conversão",
    base_line: "Linha Base",
    span_a: "Senkou Span A",
    span_b: "Senkou Span B",
    cloud_bullish: "Nuvem (Alta)",
    cloud_bearish: "Nuvem (Baixa)",
    translate: "Traduzir",
    crypto: "Cripto",
    apply: "Aplicar",
};

/// Normalize a requested language, defaulting to English
pub fn get_language(language: Option<&str>) -> &'static str {
    match language.map(|l| l.trim().to_ascii_lowercase()) {
        Some(l) if l == "pt" || l.starts_with("pt-") => "pt",
        _ => "en",
    }
}

/// Text for the selected language; unknown codes get English
pub fn selected_language(language: &str) -> TextDict {
    match get_language(Some(language)) {
        "pt" => PT,
        _ => EN,
    }
}

impl TextDict {
    /// Figure labels for the chart builders
    pub fn chart_text(&self) -> ChartText {
        ChartText {
            close_price_plot: self.close_price_plot.map(str::to_string),
            rsi_title: self.rsi_title.to_string(),
            quarter_graph_title: self.quarter_graph_title.to_string(),
            ichimoku_title: self.ichimoku_title.to_string(),
            close_price: self.close_price.to_string(),
            conversion_line: self.conversion_line.to_string(),
            base_line: self.base_line.to_string(),
            span_a: self.span_a.to_string(),
            span_b: self.span_b.to_string(),
            cloud_bullish: self.cloud_bullish.to_string(),
            cloud_bearish: self.cloud_bearish.to_string(),
        }
    }
}
