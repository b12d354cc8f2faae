//! Automated model search
//!
//! Every (transformer, model) pair is fitted on the series minus a holdout
//! window of `forecast_length` points, scored by mean absolute error on that
//! window, and the winner is refitted on the full series.

use crate::data::{Frequency, SeriesPoint};
use crate::forecast::{
    EtsModel, FittedTransform, Forecast, ForecastError, ForecastPoint, ModelKind, Transformer,
};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info};

/// Settings of an automated forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    pub forecast_length: usize,
    pub frequency: Frequency,
    pub prediction_interval: f64,
    pub transformers: Vec<Transformer>,
    pub models: Vec<ModelKind>,
    pub max_generations: usize,
    pub num_validations: usize,
}

impl ForecastSettings {
    /// Defaults used for the dashboard's monthly and quarterly projections
    pub fn new(frequency: Frequency) -> Self {
        Self {
            forecast_length: 1,
            frequency,
            prediction_interval: 0.9,
            transformers: Transformer::ALL.to_vec(),
            models: ModelKind::ETS.to_vec(),
            max_generations: 2,
            num_validations: 1,
        }
    }

    pub fn with_forecast_length(mut self, forecast_length: usize) -> Self {
        self.forecast_length = forecast_length;
        self
    }

    /// Fewest observations accepted: one year of monthly data, or four quarters
    pub fn min_observations(&self) -> usize {
        self.frequency.season_length() + self.forecast_length.saturating_sub(1)
    }
}

/// Search driver
#[derive(Debug, Clone)]
pub struct AutoForecaster {
    settings: ForecastSettings,
}

struct Candidate {
    transformer: Option<Transformer>,
    model: ModelKind,
}

impl AutoForecaster {
    pub fn new(settings: ForecastSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Fit the best candidate and forecast the periods after `series`
    pub fn fit_predict(&self, series: &[SeriesPoint]) -> Result<Forecast, ForecastError> {
        let settings = &self.settings;
        let horizon = settings.forecast_length;
        if horizon == 0 {
            return Err(ForecastError::ZeroHorizon);
        }
        if !(settings.prediction_interval > 0.0 && settings.prediction_interval < 1.0) {
            return Err(ForecastError::InvalidInterval(settings.prediction_interval));
        }
        if let Some(row) = series.iter().position(|p| !p.value.is_finite()) {
            return Err(ForecastError::NonFinite(row));
        }
        let required = settings.min_observations();
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: series.len(),
            });
        }
        let insufficient = ForecastError::InsufficientData {
            required: required + 1,
            actual: series.len(),
        };

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let season = settings.frequency.season_length();

        let mut best: Option<(f64, Candidate)> = None;
        for candidate in self.candidates() {
            let Some(mae) = self.validate(&candidate, &values, season) else {
                debug!(
                    "Skipping {} / {:?}: not enough data",
                    candidate.model, candidate.transformer
                );
                continue;
            };
            debug!("{} / {:?} validation MAE {:.4}", candidate.model, candidate.transformer, mae);
            if best.as_ref().map_or(true, |(b, _)| mae < *b) {
                best = Some((mae, candidate));
            }
        }
        let (validation_mae, winner) = best.ok_or(insufficient.clone())?;

        let (model, fitted) =
            fit_candidate(&winner, &values, season, settings.max_generations).ok_or(insufficient)?;
        let point_forecasts = fitted.inverse(&model.forecast(horizon));

        let z = z_score(settings.prediction_interval);
        let sigma = model.residual_std();
        let last_date = series[series.len() - 1].date;
        let points = point_forecasts
            .into_iter()
            .enumerate()
            .map(|(h, value)| {
                let half_width = z * sigma * ((h + 1) as f64).sqrt();
                ForecastPoint {
                    date: settings.frequency.advance(last_date, (h + 1) as u32),
                    value,
                    lower: value - half_width,
                    upper: value + half_width,
                }
            })
            .collect();

        info!(
            "Selected {} with transformer {:?} (MAE {:.4}) over {} {:?} observations",
            winner.model,
            winner.transformer,
            validation_mae,
            series.len(),
            settings.frequency
        );

        Ok(Forecast {
            points,
            model: winner.model,
            transformer: winner.transformer,
            validation_mae,
        })
    }

    fn candidates(&self) -> Vec<Candidate> {
        let transformers = std::iter::once(None).chain(self.settings.transformers.iter().copied().map(Some));
        transformers
            .flat_map(|transformer| {
                self.settings
                    .models
                    .iter()
                    .map(move |&model| Candidate { transformer, model })
            })
            .collect()
    }

    /// Mean absolute error over the backward validation windows
    fn validate(&self, candidate: &Candidate, values: &[f64], season: usize) -> Option<f64> {
        let horizon = self.settings.forecast_length;
        let validations = self.settings.num_validations.max(1);
        let mut total = 0.0;
        for k in 0..validations {
            let cut = values.len().checked_sub(horizon * (k + 1))?;
            let (train, test) = values.split_at(cut);
            let test = &test[..horizon];
            let (model, fitted) =
                fit_candidate(candidate, train, season, self.settings.max_generations)?;
            let predicted = fitted.inverse(&model.forecast(horizon));
            total += predicted
                .iter()
                .zip(test)
                .map(|(p, a)| (p - a).abs())
                .sum::<f64>()
                / horizon as f64;
        }
        Some(total / validations as f64)
    }
}

fn fit_candidate(
    candidate: &Candidate,
    values: &[f64],
    season: usize,
    generations: usize,
) -> Option<(EtsModel, FittedTransform)> {
    let (transformed, fitted) = match candidate.transformer {
        Some(transformer) => transformer.fit_transform(values, season)?,
        None => (values.to_vec(), FittedTransform::Identity),
    };
    let model = EtsModel::fit(candidate.model, &transformed, generations)?;
    Some((model, fitted))
}

/// Two-sided normal quantile for a central interval of `coverage`
fn z_score(coverage: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(0.5 + coverage / 2.0))
        .unwrap_or(1.645)
}
