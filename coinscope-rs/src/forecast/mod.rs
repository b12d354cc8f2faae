//! Forecast module
//!
//! Automated short-horizon forecasting of resampled close prices: a small
//! search over series transformers and exponential smoothing models, scored
//! by backward validation.

pub mod auto;
pub mod ets;
pub mod transform;

pub use auto::*;
pub use ets::*;
pub use transform::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least {required} observations to forecast, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series contains a non-finite value at row {0}")]
    NonFinite(usize),

    #[error("forecast length must be positive")]
    ZeroHorizon,

    #[error("prediction interval must be within (0, 1), got {0}")]
    InvalidInterval(f64),
}

/// One projected period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Result of an automated forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub model: ModelKind,
    pub transformer: Option<Transformer>,
    /// Mean absolute error on the validation window
    pub validation_mae: f64,
}

impl Forecast {
    pub fn first(&self) -> Option<&ForecastPoint> {
        self.points.first()
    }
}
