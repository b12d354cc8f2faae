//! CoinScope-RS: market analytics behind the CoinScope dashboard
//!
//! This crate turns a daily OHLCV history into everything the dashboard shows:
//! - [ta-rs](https://github.com/greyblake/ta-rs) for the RSI and rolling extrema
//! - an ETS-family auto forecaster for monthly and quarterly projections
//! - Plotly figure descriptions serialized with serde
//!
//! # Features
//!
//! - **Data**: candles, calendar resampling, QoQ change, CSV price panels
//! - **Indicators**: RSI, Ichimoku Cloud
//! - **Forecast**: transformer + exponential smoothing model search
//! - **Charts**: close price, RSI, QoQ and Ichimoku figures
//! - **Analysis**: the full pipeline in one call
//!
//! # Example
//!
//! ```no_run
//! use coinscope_rs::prelude::*;
//!
//! fn build(candles: Vec<Candle>) -> Result<()> {
//!     let analysis = MarketAnalysis::compute(candles.into(), None, &AnalysisSettings::default())?;
//!     println!("forecast available: {}", analysis.has_forecast());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod charts;
pub mod data;
pub mod forecast;
pub mod indicators;

// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::charts::*;
    pub use crate::data::*;
    pub use crate::forecast::*;
    pub use crate::indicators::*;

    pub use anyhow::{Context, Result};
}

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
