use crate::error::ApiError;
use anyhow::anyhow;
use chrono::NaiveDate;
use coinscope_rs::analysis::{AnalysisSettings, MarketAnalysis};
use coinscope_rs::data::{CandleSeries, PricePanel};
use shared::market_data::fallback_coins;
use shared::{yahoo_ticker, Coin, Config, DateWindow, MarketDataSource, TtlCache};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// (Yahoo ticker, start, end)
type WindowKey = (String, NaiveDate, NaiveDate);

pub struct AppState {
    pub config: Config,
    source: Arc<dyn MarketDataSource>,
    panel: Option<Arc<PricePanel>>,
    coins: TtlCache<(), Vec<Coin>>,
    history: TtlCache<WindowKey, CandleSeries>,
    analyses: TtlCache<WindowKey, Arc<MarketAnalysis>>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn MarketDataSource>, panel: Option<PricePanel>) -> Self {
        let ttl = config.cache_ttl;
        let max_entries = config.cache_max_entries;
        Self {
            config,
            source,
            panel: panel.map(Arc::new),
            coins: TtlCache::new(ttl, 1),
            history: TtlCache::new(ttl, max_entries),
            analyses: TtlCache::new(ttl, max_entries),
        }
    }

    pub fn settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            rsi_window: self.config.rsi_window,
            ichimoku: self.config.ichimoku,
            forecast_length: self.config.forecast_length,
        }
    }

    /// Coin selector contents; falls back to the built-in majors
    pub async fn coins(&self) -> Vec<Coin> {
        let result = self
            .coins
            .get_or_try_insert((), || self.source.coin_universe())
            .await;
        match result {
            Ok(coins) => coins,
            Err(e) => {
                warn!("Coin universe unavailable: {}", e);
                fallback_coins()
            }
        }
    }

    pub async fn history(&self, symbol: &str, window: DateWindow) -> Result<CandleSeries, ApiError> {
        let key = (yahoo_ticker(symbol)?, window.start, window.end);
        let candles = self
            .history
            .get_or_try_insert(key, || {
                self.source.daily_history(symbol, window.start, Some(window.end))
            })
            .await?;
        Ok(candles)
    }

    /// Full pipeline for `symbol` over `window`, memoized
    pub async fn analysis(&self, symbol: &str, window: DateWindow) -> Result<Arc<MarketAnalysis>, ApiError> {
        let key = (yahoo_ticker(symbol)?, window.start, window.end);
        self.analyses
            .get_or_try_insert(key, || async {
                let candles = self.history(symbol, window).await?;
                let panel = self.panel.clone();
                let settings = self.settings();
                let analysis = tokio::task::spawn_blocking(move || {
                    MarketAnalysis::compute(candles, panel.as_deref(), &settings)
                })
                .await
                .map_err(|e| anyhow!("analysis task failed: {}", e))??;
                Ok::<_, ApiError>(Arc::new(analysis))
            })
            .await
    }
}

/// Load the optional price panel; a missing or unreadable file only disables it
pub fn load_panel(path: impl AsRef<Path>) -> Option<PricePanel> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No price panel at {}, QoQ will use downloaded history", path.display());
        return None;
    }
    match PricePanel::from_path(path) {
        Ok(panel) => {
            info!("Loaded price panel {} ({} tickers)", path.display(), panel.tickers().count());
            Some(panel)
        }
        Err(e) => {
            warn!("Ignoring price panel {}: {}", path.display(), e);
            None
        }
    }
}
