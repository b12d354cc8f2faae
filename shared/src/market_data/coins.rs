//! Coin universe from the CoinGecko markets endpoint

use crate::error::MarketDataError;
use crate::market_data::Coin;
use serde::Deserialize;
use std::collections::HashSet;

/// One row of `/coins/markets`
#[derive(Debug, Deserialize)]
pub struct CoinGeckoMarket {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    url: String,
    limit: usize,
}

impl CoinGeckoClient {
    pub fn new(client: reqwest::Client, url: &str, limit: usize) -> Self {
        Self {
            client,
            url: url.to_string(),
            limit: limit.clamp(1, 250),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Coins ordered by market capitalisation
    pub async fn markets(&self) -> Result<Vec<Coin>, MarketDataError> {
        let per_page = self.limit.to_string();
        let rows: Vec<CoinGeckoMarket> = self
            .client
            .get(&self.url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| MarketDataError::http(&self.url, e))?
            .json()
            .await
            .map_err(|e| MarketDataError::http(&self.url, e))?;
        Ok(parse_markets(rows))
    }
}

/// Drop incomplete rows, upper-case symbols and keep the first occurrence
/// of each symbol
pub fn parse_markets(rows: Vec<CoinGeckoMarket>) -> Vec<Coin> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter_map(|row| {
            let name = row.name?.trim().to_string();
            let symbol = row.symbol?.trim().to_ascii_uppercase();
            (!name.is_empty() && !symbol.is_empty()).then(|| Coin::new(name, symbol))
        })
        .filter(|coin| seen.insert(coin.symbol.clone()))
        .collect()
}

/// Majors served when the coin list cannot be fetched
pub fn fallback_coins() -> Vec<Coin> {
    [
        ("Bitcoin", "BTC"),
        ("Ethereum", "ETH"),
        ("Tether", "USDT"),
        ("BNB", "BNB"),
        ("Solana", "SOL"),
        ("XRP", "XRP"),
        ("USDC", "USDC"),
        ("Cardano", "ADA"),
        ("Dogecoin", "DOGE"),
        ("TRON", "TRX"),
        ("Avalanche", "AVAX"),
        ("Chainlink", "LINK"),
        ("Polkadot", "DOT"),
        ("Litecoin", "LTC"),
    ]
    .into_iter()
    .map(|(name, symbol)| Coin::new(name, symbol))
    .collect()
}
