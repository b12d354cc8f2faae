use anyhow::Context;
use coinscope_rs::indicators::IchimokuConfig;
use dotenv::dotenv;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub yahoo_base_url: String,
    pub coin_list_url: String,
    pub coin_list_limit: usize,
    pub price_panel_csv: String,
    pub default_language: String,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub http_timeout: Duration,
    pub rsi_window: usize,
    pub ichimoku: IchimokuConfig,
    pub forecast_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:9999".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            coin_list_url: "https://api.coingecko.com/api/v3/coins/markets".to_string(),
            coin_list_limit: 100,
            price_panel_csv: "./data/stocks/gold/crypto_trading.csv".to_string(),
            default_language: "en".to_string(),
            cache_ttl: Duration::from_secs(900),
            cache_max_entries: 256,
            http_timeout: Duration::from_secs(20),
            rsi_window: 5,
            ichimoku: IchimokuConfig::default(),
            forecast_length: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            yahoo_base_url: std::env::var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            coin_list_url: std::env::var("COIN_LIST_URL").unwrap_or(defaults.coin_list_url),
            coin_list_limit: parse_var("COIN_LIST_LIMIT", defaults.coin_list_limit)?,
            price_panel_csv: std::env::var("PRICE_PANEL_CSV").unwrap_or(defaults.price_panel_csv),
            default_language: std::env::var("DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
            cache_ttl: Duration::from_secs(parse_var("CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
            http_timeout: Duration::from_secs(parse_var(
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),
            rsi_window: parse_var("RSI_WINDOW", defaults.rsi_window)?,
            ichimoku: match std::env::var("ICHIMOKU_WINDOWS") {
                Ok(raw) => parse_windows(&raw)?,
                Err(_) => defaults.ichimoku,
            },
            forecast_length: parse_var("FORECAST_LENGTH", defaults.forecast_length)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Parse `ICHIMOKU_WINDOWS`, e.g. `7,21,49`
pub fn parse_windows(raw: &str) -> Result<IchimokuConfig, anyhow::Error> {
    let windows = raw
        .split(',')
        .map(|w| w.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("ICHIMOKU_WINDOWS must be three integers, got {:?}", raw))?;
    match windows.as_slice() {
        [w1, w2, w3] => Ok(IchimokuConfig::new(*w1, *w2, *w3)?),
        _ => anyhow::bail!("ICHIMOKU_WINDOWS must be three integers, got {:?}", raw),
    }
}
