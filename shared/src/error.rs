use thiserror::Error;

/// Failures talking to the market-data providers
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },

    #[error("no price history for {0}")]
    NoData(String),

    #[error("invalid ticker symbol {0:?}")]
    InvalidSymbol(String),
}

impl MarketDataError {
    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }
}
