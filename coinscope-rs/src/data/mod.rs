//! Data management module
//!
//! Daily candles, calendar resampling and the optional CSV price panel.

pub mod candle;
pub mod panel;
pub mod resample;

pub use candle::*;
pub use panel::*;
pub use resample::*;

use thiserror::Error;

/// Errors raised while loading or reshaping price data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("price panel {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("price panel has no `{0}` column")]
    MissingColumn(String),

    #[error("invalid date `{value}` in row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("series is empty")]
    EmptySeries,
}
