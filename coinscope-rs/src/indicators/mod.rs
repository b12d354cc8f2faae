//! Technical indicators module
//!
//! Provides technical analysis indicators using the `ta` crate.

pub mod ichimoku;
pub mod rsi;

pub use ichimoku::*;
pub use rsi::*;

use thiserror::Error;

/// Indicator trait for all single-input indicators
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;
}

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("{indicator} window must be positive")]
    ZeroWindow { indicator: &'static str },

    #[error("ichimoku windows must increase, got {0}/{1}/{2}")]
    UnorderedWindows(usize, usize, usize),

    #[error("high and low series differ in length ({highs} vs {lows})")]
    LengthMismatch { highs: usize, lows: usize },
}
