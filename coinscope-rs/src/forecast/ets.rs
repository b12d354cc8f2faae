//! Exponential smoothing (ETS) models with additive errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Member of the ETS family searched by the auto forecaster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Simple exponential smoothing, ETS(A,N,N)
    Simple,
    /// Holt's linear trend, ETS(A,A,N)
    Holt,
    /// Damped trend, ETS(A,Ad,N)
    DampedHolt,
}

impl ModelKind {
    /// The ETS members tried by default
    pub const ETS: [ModelKind; 3] = [ModelKind::Simple, ModelKind::Holt, ModelKind::DampedHolt];

    pub fn min_observations(self) -> usize {
        match self {
            ModelKind::Simple => 2,
            ModelKind::Holt | ModelKind::DampedHolt => 3,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Simple => "ETS(A,N,N)",
            ModelKind::Holt => "ETS(A,A,N)",
            ModelKind::DampedHolt => "ETS(A,Ad,N)",
        };
        f.write_str(name)
    }
}

/// Smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtsParams {
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
}

/// A fitted ETS model, holding the final level and trend
#[derive(Debug, Clone, PartialEq)]
pub struct EtsModel {
    pub kind: ModelKind,
    pub params: EtsParams,
    level: f64,
    trend: f64,
    /// In-sample one-step-ahead errors
    residuals: Vec<f64>,
}

const GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
const DAMPING: [f64; 3] = [0.8, 0.9, 0.98];

impl EtsModel {
    /// Fit by minimizing the in-sample one-step squared error.
    ///
    /// The first generation scans a coarse grid, every later one refines
    /// around the incumbent with a step ten times finer.
    pub fn fit(kind: ModelKind, values: &[f64], generations: usize) -> Option<Self> {
        if values.len() < kind.min_observations() {
            return None;
        }

        let betas: &[f64] = match kind {
            ModelKind::Simple => &[0.0],
            _ => &GRID,
        };
        let phis: &[f64] = match kind {
            ModelKind::Simple | ModelKind::Holt => &[1.0],
            ModelKind::DampedHolt => &DAMPING,
        };

        let mut best: Option<(f64, EtsParams)> = None;
        let consider = |best: &mut Option<(f64, EtsParams)>, params: EtsParams| {
            let sse = Self::run(kind, params, values).sse();
            if sse.is_finite() && best.map_or(true, |(b, _)| sse < b) {
                *best = Some((sse, params));
            }
        };
        for &alpha in &GRID {
            for &beta in betas {
                for &phi in phis {
                    consider(&mut best, EtsParams { alpha, beta, phi });
                }
            }
        }

        let mut step = 0.1;
        for _ in 1..generations.max(1) {
            step /= 10.0;
            let Some((_, centre)) = best else { break };
            for da in -5..=5 {
                for db in -5..=5 {
                    if kind == ModelKind::Simple && db != 0 {
                        continue;
                    }
                    consider(&mut best, EtsParams {
                        alpha: clamp_unit(centre.alpha + da as f64 * step),
                        beta: if kind == ModelKind::Simple {
                            0.0
                        } else {
                            clamp_unit(centre.beta + db as f64 * step)
                        },
                        phi: centre.phi,
                    });
                }
            }
        }

        let (_, params) = best?;
        Some(Self::run(kind, params, values))
    }

    /// Run the smoothing recursions for fixed parameters
    fn run(kind: ModelKind, params: EtsParams, values: &[f64]) -> Self {
        let EtsParams { alpha, beta, phi } = params;
        let mut level = values[0];
        let mut trend = match kind {
            ModelKind::Simple => 0.0,
            _ => values[1] - values[0],
        };
        let mut residuals = Vec::with_capacity(values.len().saturating_sub(1));

        for &y in &values[1..] {
            let damped = phi * trend;
            let prediction = level + damped;
            residuals.push(y - prediction);

            let new_level = alpha * y + (1.0 - alpha) * prediction;
            if kind != ModelKind::Simple {
                trend = beta * (new_level - level) + (1.0 - beta) * damped;
            }
            level = new_level;
        }

        Self {
            kind,
            params,
            level,
            trend,
            residuals,
        }
    }

    fn sse(&self) -> f64 {
        self.residuals.iter().map(|e| e * e).sum()
    }

    /// Point forecasts for the next `horizon` steps
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let phi = self.params.phi;
        let mut damp_sum = 0.0;
        let mut damp = 1.0;
        (0..horizon)
            .map(|_| {
                damp *= phi;
                damp_sum += damp;
                self.level + damp_sum * self.trend
            })
            .collect()
    }

    /// Standard deviation of the one-step in-sample errors
    pub fn residual_std(&self) -> f64 {
        let n = self.residuals.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.residuals.iter().sum::<f64>() / n as f64;
        let var = self.residuals.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.01, 0.99)
}
