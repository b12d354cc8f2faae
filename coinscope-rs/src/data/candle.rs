//! OHLCV candle data structures

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
    /// Session open time
    pub timestamp: DateTime<Utc>,
    /// Yahoo ticker (e.g., "BTC-USD")
    pub symbol: String,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
            symbol: symbol.into(),
        }
    }

    /// Calendar day of the candle
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Check if candle is bullish
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if candle is bearish
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Get total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Get median price (HL/2)
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Date-ordered collection of candles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of candles, sorted oldest first
    pub fn from_vec(candles: Vec<Candle>) -> Self {
        let mut series = Self { candles };
        series.sort_by_time();
        series
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Ticker of the first candle, if any
    pub fn symbol(&self) -> Option<&str> {
        self.candles.first().map(|c| c.symbol.as_str())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.candles.iter().map(Candle::date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// Close prices keyed by calendar day
    pub fn close_points(&self) -> Vec<(NaiveDate, f64)> {
        self.candles.iter().map(|c| (c.date(), c.close)).collect()
    }

    /// Sort by timestamp (oldest first)
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.timestamp);
    }

    /// Candles whose day falls inside `[start, end]`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            candles: self
                .candles
                .iter()
                .filter(|c| (start..=end).contains(&c.date()))
                .cloned()
                .collect(),
        }
    }

    /// The last `n` candles
    pub fn tail(&self, n: usize) -> &[Candle] {
        let skip = self.candles.len().saturating_sub(n);
        &self.candles[skip..]
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_vec(candles)
    }
}
