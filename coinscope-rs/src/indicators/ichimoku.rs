//! Ichimoku Cloud indicator
//!
//! All four lines are computed on the current row, without the forward
//! displacement of the senkou spans, so they can be appended to the daily
//! table column by column.

use crate::indicators::IndicatorError;
use serde::{Deserialize, Serialize};
use ta::indicators::{Maximum, Minimum};
use ta::Next;

/// Window lengths for the conversion line, base line and span B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IchimokuConfig {
    pub window1: usize,
    pub window2: usize,
    pub window3: usize,
}

impl Default for IchimokuConfig {
    /// Faster-than-classic windows suited to markets that trade every day
    fn default() -> Self {
        Self {
            window1: 7,
            window2: 21,
            window3: 49,
        }
    }
}

impl IchimokuConfig {
    pub fn new(window1: usize, window2: usize, window3: usize) -> Result<Self, IndicatorError> {
        let config = Self {
            window1,
            window2,
            window3,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.window1 == 0 || self.window2 == 0 || self.window3 == 0 {
            return Err(IndicatorError::ZeroWindow { indicator: "Ichimoku" });
        }
        if !(self.window1 <= self.window2 && self.window2 <= self.window3) {
            return Err(IndicatorError::UnorderedWindows(
                self.window1,
                self.window2,
                self.window3,
            ));
        }
        Ok(())
    }
}

/// One row of Ichimoku output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IchimokuPoint {
    /// Tenkan-sen
    pub conversion_line: Option<f64>,
    /// Kijun-sen
    pub base_line: Option<f64>,
    /// Senkou span A
    pub span_a: Option<f64>,
    /// Senkou span B
    pub span_b: Option<f64>,
}

impl IchimokuPoint {
    /// `Some(true)` when span A is at or above span B (bullish cloud)
    pub fn is_bullish_cloud(&self) -> Option<bool> {
        Some(self.span_a? >= self.span_b?)
    }
}

/// Rolling midpoint of the highest high and lowest low over a window
#[derive(Debug, Clone)]
struct MidRange {
    max: Maximum,
    min: Minimum,
    period: usize,
    seen: usize,
}

impl MidRange {
    fn new(period: usize) -> Result<Self, IndicatorError> {
        let zero = |_| IndicatorError::ZeroWindow { indicator: "Ichimoku" };
        Ok(Self {
            max: Maximum::new(period).map_err(zero)?,
            min: Minimum::new(period).map_err(zero)?,
            period,
            seen: 0,
        })
    }

    fn next(&mut self, high: f64, low: f64) -> Option<f64> {
        let highest = self.max.next(high);
        let lowest = self.min.next(low);
        self.seen += 1;
        (self.seen >= self.period).then_some((highest + lowest) / 2.0)
    }
}

/// Streaming Ichimoku calculator fed with daily highs and lows
#[derive(Debug, Clone)]
pub struct Ichimoku {
    config: IchimokuConfig,
    conversion: MidRange,
    base: MidRange,
    span_b: MidRange,
    last: IchimokuPoint,
}

impl Ichimoku {
    pub fn new(config: IchimokuConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self {
            config,
            conversion: MidRange::new(config.window1)?,
            base: MidRange::new(config.window2)?,
            span_b: MidRange::new(config.window3)?,
            last: IchimokuPoint::default(),
        })
    }

    pub fn config(&self) -> IchimokuConfig {
        self.config
    }

    pub fn name(&self) -> &str {
        "Ichimoku"
    }

    /// Feed one row and return the lines for it
    pub fn update(&mut self, high: f64, low: f64) -> IchimokuPoint {
        let conversion_line = self.conversion.next(high, low);
        let base_line = self.base.next(high, low);
        let span_a = match (conversion_line, base_line) {
            (Some(c), Some(b)) => Some((c + b) / 2.0),
            _ => None,
        };
        self.last = IchimokuPoint {
            conversion_line,
            base_line,
            span_a,
            span_b: self.span_b.next(high, low),
        };
        self.last
    }

    pub fn value(&self) -> IchimokuPoint {
        self.last
    }

    /// Every line has a full window behind it
    pub fn is_ready(&self) -> bool {
        self.last.span_b.is_some()
    }
}

/// Calculate Ichimoku lines for aligned high/low series
pub fn calculate_ichimoku(
    highs: &[f64],
    lows: &[f64],
    config: IchimokuConfig,
) -> Result<Vec<IchimokuPoint>, IndicatorError> {
    if highs.len() != lows.len() {
        return Err(IndicatorError::LengthMismatch {
            highs: highs.len(),
            lows: lows.len(),
        });
    }
    let mut ichimoku = Ichimoku::new(config)?;
    Ok(highs
        .iter()
        .zip(lows)
        .map(|(&high, &low)| ichimoku.update(high, low))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midrange_lines() {
        let config = IchimokuConfig::new(2, 3, 4).unwrap();
        let highs = [10.0, 12.0, 11.0, 15.0, 13.0];
        let lows = [8.0, 9.0, 7.0, 10.0, 11.0];
        let lines = calculate_ichimoku(&highs, &lows, config).unwrap();

        assert_eq!(lines[0].conversion_line, None);
        assert_eq!(lines[1].conversion_line, Some((12.0 + 8.0) / 2.0));
        assert_eq!(lines[1].base_line, None);
        assert_eq!(lines[2].base_line, Some((12.0 + 7.0) / 2.0));
        // conversion at row 2 covers rows 1..=2
        assert_eq!(lines[2].conversion_line, Some((12.0 + 7.0) / 2.0));
        assert_eq!(lines[2].span_a, Some((9.5 + 9.5) / 2.0));
        assert_eq!(lines[2].span_b, None);
        assert_eq!(lines[3].span_b, Some((15.0 + 7.0) / 2.0));
        assert_eq!(lines[4].span_b, Some((15.0 + 7.0) / 2.0));
    }

    #[test]
    fn test_default_windows() {
        let config = IchimokuConfig::default();
        assert_eq!((config.window1, config.window2, config.window3), (7, 21, 49));
        let ichimoku = Ichimoku::new(config).unwrap();
        assert!(!ichimoku.is_ready());
    }

    #[test]
    fn test_invalid_windows() {
        assert_eq!(
            IchimokuConfig::new(0, 21, 49).unwrap_err(),
            IndicatorError::ZeroWindow { indicator: "Ichimoku" }
        );
        assert_eq!(
            IchimokuConfig::new(21, 7, 49).unwrap_err(),
            IndicatorError::UnorderedWindows(21, 7, 49)
        );
    }

    #[test]
    fn test_length_mismatch() {
        let err = calculate_ichimoku(&[1.0, 2.0], &[1.0], IchimokuConfig::default()).unwrap_err();
        assert_eq!(err, IndicatorError::LengthMismatch { highs: 2, lows: 1 });
    }

    #[test]
    fn test_cloud_direction() {
        let bullish = IchimokuPoint {
            span_a: Some(2.0),
            span_b: Some(1.0),
            ..Default::default()
        };
        assert_eq!(bullish.is_bullish_cloud(), Some(true));
        assert_eq!(IchimokuPoint::default().is_bullish_cloud(), None);
    }
}
