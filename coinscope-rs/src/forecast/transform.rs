//! Reversible series transformers applied before model fitting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transformer applied to the series before a model is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transformer {
    /// Subtract the value one season earlier
    SeasonalDifference,
    /// Remove a least-squares linear trend
    Detrend,
    /// First difference
    DifferencedTransformer,
}

impl Transformer {
    pub const ALL: [Transformer; 3] = [
        Transformer::SeasonalDifference,
        Transformer::Detrend,
        Transformer::DifferencedTransformer,
    ];

    /// Observations consumed by the transform itself
    pub fn lost_rows(self, season_length: usize) -> usize {
        match self {
            Transformer::SeasonalDifference => season_length,
            Transformer::Detrend => 0,
            Transformer::DifferencedTransformer => 1,
        }
    }

    /// Fit on `values` and return the transformed series plus the state
    /// needed to map forecasts back. `None` when the series is too short.
    pub fn fit_transform(self, values: &[f64], season_length: usize) -> Option<(Vec<f64>, FittedTransform)> {
        match self {
            Transformer::SeasonalDifference => {
                let lag = season_length.max(1);
                if values.len() <= lag {
                    return None;
                }
                let transformed = values
                    .iter()
                    .skip(lag)
                    .zip(values)
                    .map(|(cur, prev)| cur - prev)
                    .collect();
                let history = values[values.len() - lag..].to_vec();
                Some((transformed, FittedTransform::SeasonalDifference { history }))
            }
            Transformer::Detrend => {
                if values.len() < 2 {
                    return None;
                }
                let (intercept, slope) = linear_fit(values);
                let transformed = values
                    .iter()
                    .enumerate()
                    .map(|(t, v)| v - (intercept + slope * t as f64))
                    .collect();
                Some((
                    transformed,
                    FittedTransform::Detrend {
                        intercept,
                        slope,
                        len: values.len(),
                    },
                ))
            }
            Transformer::DifferencedTransformer => {
                let last = *values.last()?;
                if values.len() < 2 {
                    return None;
                }
                let transformed = values.windows(2).map(|w| w[1] - w[0]).collect();
                Some((transformed, FittedTransform::Differenced { last }))
            }
        }
    }
}

impl fmt::Display for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transformer::SeasonalDifference => "SeasonalDifference",
            Transformer::Detrend => "Detrend",
            Transformer::DifferencedTransformer => "DifferencedTransformer",
        };
        f.write_str(name)
    }
}

/// State captured by [`Transformer::fit_transform`]
#[derive(Debug, Clone, PartialEq)]
pub enum FittedTransform {
    Identity,
    SeasonalDifference { history: Vec<f64> },
    Detrend { intercept: f64, slope: f64, len: usize },
    Differenced { last: f64 },
}

impl FittedTransform {
    /// Map forecasts made in transformed space back to price space
    pub fn inverse(&self, forecasts: &[f64]) -> Vec<f64> {
        match self {
            FittedTransform::Identity => forecasts.to_vec(),
            FittedTransform::SeasonalDifference { history } => {
                let lag = history.len();
                let mut extended = history.clone();
                for (h, f) in forecasts.iter().enumerate() {
                    // value one season before step h
                    let base = extended[h];
                    extended.push(f + base);
                }
                extended.split_off(lag)
            }
            FittedTransform::Detrend {
                intercept,
                slope,
                len,
            } => forecasts
                .iter()
                .enumerate()
                .map(|(h, f)| f + intercept + slope * (len + h) as f64)
                .collect(),
            FittedTransform::Differenced { last } => forecasts
                .iter()
                .scan(*last, |level, diff| {
                    *level += diff;
                    Some(*level)
                })
                .collect(),
        }
    }
}

/// Ordinary least squares of `values` against their index
pub fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.len() < 2 {
        return (values.first().copied().unwrap_or(0.0), 0.0);
    }
    let mean_t = (n - 1.0) / 2.0;
    let mean_v = values.iter().sum::<f64>() / n;
    let (mut cov, mut var) = (0.0, 0.0);
    for (t, v) in values.iter().enumerate() {
        let dt = t as f64 - mean_t;
        cov += dt * (v - mean_v);
        var += dt * dt;
    }
    let slope = cov / var;
    (mean_v - slope * mean_t, slope)
}
