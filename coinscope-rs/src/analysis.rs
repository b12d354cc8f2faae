//! The dashboard pipeline: one daily history in, every table and figure out

use crate::charts::{
    close_price_chart, close_price_fallback_chart, ichimoku_chart, qoq_chart, rsi_chart, ChartText,
    Figure, IchimokuRow, Theme,
};
use crate::data::{
    complete_quarters, fill_gaps, qoq_from_daily, resample_median, within, CandleSeries, DataError,
    Frequency, PricePanel, SeriesPoint,
};
use crate::forecast::{AutoForecaster, Forecast, ForecastError, ForecastSettings};
use crate::indicators::{
    calculate_ichimoku, calculate_rsi, IchimokuConfig, IchimokuPoint, DEFAULT_RSI_WINDOW,
};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Tunables of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub rsi_window: usize,
    pub ichimoku: IchimokuConfig,
    pub forecast_length: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            rsi_window: DEFAULT_RSI_WINDOW,
            ichimoku: IchimokuConfig::default(),
            forecast_length: 1,
        }
    }
}

/// One day of the enriched table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub rsi: Option<f64>,
    pub tenkan_sen: Option<f64>,
    pub kijun_sen: Option<f64>,
    pub senkou_span_a: Option<f64>,
    pub senkou_span_b: Option<f64>,
}

/// Monthly and quarterly projections; both exist or neither does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projections {
    pub monthly: Forecast,
    pub quarterly: Forecast,
}

/// Where the QoQ bars came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QoqSource {
    PricePanel,
    History,
}

/// The four dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub close_price: Figure,
    pub rsi: Figure,
    pub qoq: Figure,
    pub ichimoku: Figure,
    pub has_forecast: bool,
}

/// Everything derived from one ticker's daily history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub ticker: String,
    pub rows: Vec<AnalysisRow>,
    pub monthly: Vec<SeriesPoint>,
    pub quarterly: Vec<SeriesPoint>,
    pub projections: Option<Projections>,
    /// Why projections are missing, when they are
    pub forecast_error: Option<String>,
    pub qoq: Vec<SeriesPoint>,
    pub qoq_source: QoqSource,
}

impl MarketAnalysis {
    /// Run indicators, resampling, forecasting and QoQ over `candles`
    pub fn compute(
        candles: CandleSeries,
        panel: Option<&PricePanel>,
        settings: &AnalysisSettings,
    ) -> Result<Self> {
        let ticker = candles.symbol().ok_or(DataError::EmptySeries)?.to_string();
        let closes = candles.closes();
        let rsi = calculate_rsi(&closes, settings.rsi_window)?;
        let lines = calculate_ichimoku(&candles.highs(), &candles.lows(), settings.ichimoku)?;

        let rows = candles
            .candles()
            .iter()
            .zip(rsi)
            .zip(lines)
            .map(|((c, rsi), line)| AnalysisRow {
                date: c.date(),
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
                rsi,
                tenkan_sen: line.conversion_line,
                kijun_sen: line.base_line,
                senkou_span_a: line.span_a,
                senkou_span_b: line.span_b,
            })
            .collect();

        let close_points = candles.close_points();
        let monthly = fill_gaps(
            &resample_median(&close_points, Frequency::MonthEnd),
            Frequency::MonthEnd,
        );
        let quarterly = fill_gaps(&complete_quarters(&close_points), Frequency::QuarterEnd);

        let (projections, forecast_error) =
            match project(&monthly, &quarterly, settings.forecast_length) {
                Ok(projections) => (Some(projections), None),
                Err(e) => {
                    warn!("No projection for {}: {}", ticker, e);
                    (None, Some(e.to_string()))
                }
            };

        let (qoq, qoq_source) = match panel.and_then(|p| p.qoq(&ticker)) {
            Some(qoq) => (qoq, QoqSource::PricePanel),
            None => (qoq_from_daily(&close_points), QoqSource::History),
        };

        info!(
            "Analysed {} over {} days ({} months, {} complete quarters)",
            ticker,
            candles.len(),
            monthly.len(),
            quarterly.len()
        );

        Ok(Self {
            ticker,
            rows,
            monthly,
            quarterly,
            projections,
            forecast_error,
            qoq,
            qoq_source,
        })
    }

    pub fn has_forecast(&self) -> bool {
        self.projections.is_some()
    }

    pub fn daily_close(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.close)).collect()
    }

    pub fn rsi(&self) -> Vec<(NaiveDate, Option<f64>)> {
        self.rows.iter().map(|r| (r.date, r.rsi)).collect()
    }

    pub fn ichimoku_rows(&self) -> Vec<IchimokuRow> {
        self.rows
            .iter()
            .map(|r| IchimokuRow {
                date: r.date,
                close: r.close,
                lines: IchimokuPoint {
                    conversion_line: r.tenkan_sen,
                    base_line: r.kijun_sen,
                    span_a: r.senkou_span_a,
                    span_b: r.senkou_span_b,
                },
            })
            .collect()
    }

    /// Build the dashboard figures; QoQ bars are limited to `[start, end]`
    pub fn charts(&self, text: &ChartText, theme: &Theme, start: NaiveDate, end: NaiveDate) -> DashboardCharts {
        let daily_close = self.daily_close();
        let close_price = match &self.projections {
            Some(p) => close_price_chart(
                text,
                &daily_close,
                &self.monthly,
                &p.monthly,
                &self.quarterly,
                &p.quarterly,
            ),
            None => close_price_fallback_chart(text, &daily_close),
        };

        DashboardCharts {
            close_price,
            rsi: rsi_chart(text, &self.rsi()),
            qoq: qoq_chart(text, &self.ticker, &within(&self.qoq, start, end)),
            ichimoku: ichimoku_chart(text, &self.ichimoku_rows(), theme),
            has_forecast: self.has_forecast(),
        }
    }
}

fn project(
    monthly: &[SeriesPoint],
    quarterly: &[SeriesPoint],
    forecast_length: usize,
) -> std::result::Result<Projections, ForecastError> {
    let forecast = |series: &[SeriesPoint], frequency| {
        AutoForecaster::new(ForecastSettings::new(frequency).with_forecast_length(forecast_length))
            .fit_predict(series)
    };
    Ok(Projections {
        monthly: forecast(monthly, Frequency::MonthEnd)?,
        quarterly: forecast(quarterly, Frequency::QuarterEnd)?,
    })
}
