//! RSI (Relative Strength Index) indicator
//!
//! Gains and losses are smoothed the Wilder way (`alpha = 1 / period`),
//! seeded with the first observation. The first close contributes a zero
//! change, so a value is available from the `period`-th close onwards.

use crate::indicators::{Indicator, IndicatorError};
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// Window the dashboard uses for its short-term RSI
pub const DEFAULT_RSI_WINDOW: usize = 5;

/// RSI indicator wrapper
#[derive(Debug, Clone)]
pub struct RSI {
    period: usize,
    up: ExponentialMovingAverage,
    down: ExponentialMovingAverage,
    prev: Option<f64>,
    update_count: usize,
    last_value: Option<f64>,
}

impl RSI {
    /// Create new RSI indicator
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::ZeroWindow { indicator: "RSI" });
        }
        // an EMA over 2n-1 samples has k = 2 / 2n, i.e. Wilder's 1/n
        let wilder = || {
            ExponentialMovingAverage::new(2 * period - 1)
                .map_err(|_| IndicatorError::ZeroWindow { indicator: "RSI" })
        };
        Ok(Self {
            period,
            up: wilder()?,
            down: wilder()?,
            prev: None,
            update_count: 0,
            last_value: None,
        })
    }

    /// Get RSI period
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for RSI {
    fn name(&self) -> &str {
        "RSI"
    }

    fn update(&mut self, value: f64) {
        let change = self.prev.map_or(0.0, |prev| value - prev);
        self.prev = Some(value);

        let avg_up = self.up.next(change.max(0.0));
        let avg_down = self.down.next((-change).max(0.0));
        self.update_count += 1;

        if self.update_count >= self.period {
            let rsi = if avg_down == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + avg_up / avg_down)
            };
            self.last_value = Some(rsi);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

/// Calculate RSI from a series of values, one entry per input row
pub fn calculate_rsi(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    let mut rsi = RSI::new(period)?;
    Ok(values
        .iter()
        .map(|&value| {
            rsi.update(value);
            rsi.value()
        })
        .collect())
}
