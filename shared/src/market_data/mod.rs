//! Market data acquisition
//!
//! Coin universe from CoinGecko, daily OHLCV history from Yahoo Finance.

pub mod coins;
pub mod yahoo;

#[cfg(test)]
mod test_server;

pub use coins::*;
pub use yahoo::*;

use crate::error::MarketDataError;
use crate::Config;
use async_trait::async_trait;
use chrono::NaiveDate;
use coinscope_rs::data::CandleSeries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A tradable coin as listed in the selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub name: String,
    pub symbol: String,
}

impl Coin {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Source of coins and price history; the HTTP implementation talks to the
/// public APIs, tests plug in canned data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Coins offered in the selector, largest first
    async fn coin_universe(&self) -> Result<Vec<Coin>, MarketDataError>;

    /// Daily candles of `symbol` quoted in USD from `start` up to `end`
    /// (today when `None`)
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<CandleSeries, MarketDataError>;
}

/// Yahoo ticker of a coin quoted in USD, e.g. `btc` -> `BTC-USD`
pub fn yahoo_ticker(symbol: &str) -> Result<String, MarketDataError> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.len() > 15 || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
    }
    Ok(format!("{}-USD", symbol.to_ascii_uppercase()))
}

/// reqwest-backed [`MarketDataSource`]
#[derive(Debug, Clone)]
pub struct HttpMarketData {
    coins: CoinGeckoClient,
    yahoo: YahooClient,
}

impl HttpMarketData {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("coinscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Same endpoints as [`HttpMarketData::new`] over an existing client
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            coins: CoinGeckoClient::new(client.clone(), &config.coin_list_url, config.coin_list_limit),
            yahoo: YahooClient::new(client, &config.yahoo_base_url),
        }
    }
}

#[async_trait]
impl MarketDataSource for HttpMarketData {
    async fn coin_universe(&self) -> Result<Vec<Coin>, MarketDataError> {
        match self.coins.markets().await {
            Ok(coins) if !coins.is_empty() => {
                info!("Loaded {} coins from {}", coins.len(), self.coins.url());
                Ok(coins)
            }
            Ok(_) => {
                warn!("Coin list from {} was empty, using built-in list", self.coins.url());
                Ok(fallback_coins())
            }
            Err(e) => {
                warn!("Failed to load coin list ({}), using built-in list", e);
                Ok(fallback_coins())
            }
        }
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<CandleSeries, MarketDataError> {
        let ticker = yahoo_ticker(symbol)?;
        self.yahoo.daily_history(&ticker, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_server::{serve, test_client};

    async fn source_for(status_line: &'static str, body: &'static str) -> HttpMarketData {
        let config = Config {
            coin_list_url: serve(status_line, body).await,
            ..Config::default()
        };
        HttpMarketData::with_client(test_client(), &config)
    }

    #[test]
    fn test_yahoo_ticker() {
        assert_eq!(yahoo_ticker("btc").unwrap(), "BTC-USD");
        assert_eq!(yahoo_ticker(" ETH ").unwrap(), "ETH-USD");
        assert!(matches!(yahoo_ticker("BTC/USD"), Err(MarketDataError::InvalidSymbol(_))));
        assert!(yahoo_ticker("").is_err());
    }

    #[tokio::test]
    async fn test_coin_list_failure_serves_fallback() {
        let source = source_for("503 Service Unavailable", "upstream down").await;
        assert_eq!(source.coin_universe().await.unwrap(), fallback_coins());
    }

    #[tokio::test]
    async fn test_empty_coin_list_serves_fallback() {
        let source = source_for("200 OK", "[]").await;
        assert_eq!(source.coin_universe().await.unwrap(), fallback_coins());
    }

    #[tokio::test]
    async fn test_coin_list_from_provider() {
        let source = source_for(
            "200 OK",
            r#"[{"name": "Bitcoin", "symbol": "btc"}, {"name": "Solana", "symbol": "sol"}]"#,
        )
        .await;
        let coins = source.coin_universe().await.unwrap();
        assert_eq!(coins, vec![Coin::new("Bitcoin", "BTC"), Coin::new("Solana", "SOL")]);
    }
}
