//! Figures shown on the dashboard

use crate::charts::{Axis, Figure, Font, Layout, Legend, RangeSlider, Theme, Title, Trace};
use crate::data::SeriesPoint;
use crate::forecast::Forecast;
use crate::indicators::IchimokuPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rows of daily history plotted in the Ichimoku chart
pub const ICHIMOKU_LOOKBACK: usize = 365;
/// RSI values plotted
pub const RSI_LOOKBACK: usize = 30;

const BULLISH_FILL: &str = "rgba(144,238,144,0.4)";
const BEARISH_FILL: &str = "rgba(240,128,128,0.4)";
const GRID_COLOR: &str = "rgba(200,200,200,0.2)";

/// Localized labels used on the figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartText {
    /// Mean, Projection, Market, Quarter Projection
    pub close_price_plot: [String; 4],
    pub rsi_title: String,
    pub quarter_graph_title: String,
    pub ichimoku_title: String,
    pub close_price: String,
    pub conversion_line: String,
    pub base_line: String,
    pub span_a: String,
    pub span_b: String,
    pub cloud_bullish: String,
    pub cloud_bearish: String,
}

impl Default for ChartText {
    fn default() -> Self {
        Self {
            close_price_plot: [
                "Mean".to_string(),
                "Projection".to_string(),
                "Market".to_string(),
                "Quarter Projection".to_string(),
            ],
            rsi_title: "RSI 5 days".to_string(),
            quarter_graph_title: "Grow QoQ".to_string(),
            ichimoku_title: "Ichimoku Cloud".to_string(),
            close_price: "Close Price".to_string(),
            conversion_line: "Conversion Line".to_string(),
            base_line: "Base Line".to_string(),
            span_a: "Senkou Span A".to_string(),
            span_b: "Senkou Span B".to_string(),
            cloud_bullish: "Cloud (Bullish)".to_string(),
            cloud_bearish: "Cloud (Bearish)".to_string(),
        }
    }
}

/// One day of the Ichimoku chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IchimokuRow {
    pub date: NaiveDate,
    pub close: f64,
    pub lines: IchimokuPoint,
}

/// A resampled history followed by its projected periods
pub fn with_forecast(history: &[SeriesPoint], forecast: &Forecast) -> Vec<SeriesPoint> {
    history
        .iter()
        .copied()
        .chain(forecast.points.iter().map(|p| SeriesPoint::new(p.date, p.value)))
        .collect()
}

fn dated(points: &[SeriesPoint]) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
    points.iter().map(|p| (p.date, Some(p.value)))
}

fn daily(points: &[(NaiveDate, f64)]) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
    points.iter().map(|&(date, value)| (date, Some(value)))
}

fn dollar_layout() -> Layout {
    Layout {
        yaxis: Some(Axis::titled("$")),
        ..Default::default()
    }
}

fn percent_layout(title: &str) -> Layout {
    Layout {
        title: Some(Title::text(title)),
        yaxis: Some(Axis::titled("%")),
        ..Default::default()
    }
}

/// Close price with monthly and quarterly projections.
///
/// Traces: monthly median plus forecast, the projected segment (last two
/// rows of that frame), the daily close, and the quarterly median plus
/// forecast.
pub fn close_price_chart(
    text: &ChartText,
    daily_close: &[(NaiveDate, f64)],
    monthly: &[SeriesPoint],
    monthly_forecast: &Forecast,
    quarterly: &[SeriesPoint],
    quarterly_forecast: &Forecast,
) -> Figure {
    let [mean, projection, market, quarter] = &text.close_price_plot;
    let monthly_frame = with_forecast(monthly, monthly_forecast);
    let projected = &monthly_frame[monthly_frame.len().saturating_sub(2)..];
    let quarterly_frame = with_forecast(quarterly, quarterly_forecast);

    Figure::new()
        .add_trace(Trace::line(mean.as_str(), dated(&monthly_frame)))
        .add_trace(Trace::line(projection.as_str(), dated(projected)))
        .add_trace(Trace::line(market.as_str(), daily(daily_close)))
        .add_trace(Trace::line(quarter.as_str(), dated(&quarterly_frame)))
        .layout(dollar_layout())
}

/// Close price alone, shown when no projection could be made
pub fn close_price_fallback_chart(text: &ChartText, daily_close: &[(NaiveDate, f64)]) -> Figure {
    Figure::new()
        .add_trace(Trace::line(text.close_price_plot[2].as_str(), daily(daily_close)))
        .layout(dollar_layout())
}

/// The most recent RSI readings
pub fn rsi_chart(text: &ChartText, rsi: &[(NaiveDate, Option<f64>)]) -> Figure {
    let recent = &rsi[rsi.len().saturating_sub(RSI_LOOKBACK)..];
    Figure::new()
        .add_trace(Trace::line("rsi", recent.iter().copied()))
        .layout(percent_layout(&text.rsi_title))
}

/// Quarter-over-quarter change bars for one ticker
pub fn qoq_chart(text: &ChartText, ticker: &str, qoq: &[SeriesPoint]) -> Figure {
    Figure::new()
        .add_trace(Trace::bar(ticker, dated(qoq)))
        .layout(percent_layout(&text.quarter_graph_title))
}

/// Ichimoku Cloud over the last year of daily data.
///
/// The cloud is drawn as two pairs of borderless traces: span A then span B
/// filled towards it, once for rows where A is at or above B and once for
/// rows where it is below. Rows outside a pair's mask are gaps.
pub fn ichimoku_chart(text: &ChartText, rows: &[IchimokuRow], theme: &Theme) -> Figure {
    let recent = &rows[rows.len().saturating_sub(ICHIMOKU_LOOKBACK)..];
    let series = |f: fn(&IchimokuRow) -> Option<f64>| -> Vec<(NaiveDate, Option<f64>)> {
        recent.iter().map(|r| (r.date, f(r))).collect()
    };
    let masked = |bullish: bool, f: fn(&IchimokuPoint) -> Option<f64>| -> Vec<(NaiveDate, Option<f64>)> {
        recent
            .iter()
            .map(|r| {
                let keep = r.lines.is_bullish_cloud() == Some(bullish);
                (r.date, if keep { f(&r.lines) } else { None })
            })
            .collect()
    };

    let text_font = Some(Font::colored(&theme.text_color));
    let layout = Layout {
        title: Some(Title {
            text: text.ichimoku_title.clone(),
            x: Some(0.0),
            font: text_font.clone(),
        }),
        plot_bgcolor: Some(theme.background_color.clone()),
        paper_bgcolor: Some(theme.background_color.clone()),
        legend: Some(Legend {
            font: text_font.clone(),
        }),
        xaxis: Some(Axis {
            tickfont: text_font.clone(),
            rangeslider: Some(RangeSlider { visible: true }),
            kind: Some("date".to_string()),
            ..Default::default()
        }),
        yaxis: Some(Axis {
            tickfont: text_font,
            showgrid: Some(true),
            gridcolor: Some(GRID_COLOR.to_string()),
            ..Default::default()
        }),
        height: Some(500),
    };

    Figure::new()
        .add_trace(Trace::line(text.close_price.as_str(), series(|r| Some(r.close))))
        .add_trace(Trace::line(
            text.conversion_line.as_str(),
            series(|r| r.lines.conversion_line),
        ))
        .add_trace(Trace::line(text.base_line.as_str(), series(|r| r.lines.base_line)).color("red"))
        .add_trace(Trace::line(text.span_a.as_str(), series(|r| r.lines.span_a)).color("green"))
        .add_trace(Trace::line(text.span_b.as_str(), series(|r| r.lines.span_b)).color("orange"))
        .add_trace(
            Trace::line("", masked(true, |p| p.span_a))
                .unnamed()
                .no_fill()
                .hidden_line()
                .hide_legend(),
        )
        .add_trace(
            Trace::line(text.cloud_bullish.as_str(), masked(true, |p| p.span_b))
                .fill_to_previous(BULLISH_FILL)
                .hidden_line(),
        )
        .add_trace(
            Trace::line("", masked(false, |p| p.span_a))
                .unnamed()
                .no_fill()
                .hidden_line()
                .hide_legend(),
        )
        .add_trace(
            Trace::line(text.cloud_bearish.as_str(), masked(false, |p| p.span_b))
                .fill_to_previous(BEARISH_FILL)
                .hidden_line(),
        )
        .layout(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Frequency;
    use crate::forecast::{ForecastPoint, ModelKind};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn forecast_at(date: NaiveDate, value: f64) -> Forecast {
        Forecast {
            points: vec![ForecastPoint {
                date,
                value,
                lower: value - 1.0,
                upper: value + 1.0,
            }],
            model: ModelKind::Holt,
            transformer: None,
            validation_mae: 0.0,
        }
    }

    #[test]
    fn test_close_price_chart_traces() {
        let text = ChartText::default();
        let monthly = vec![
            SeriesPoint::new(d(2024, 1, 31), 10.0),
            SeriesPoint::new(d(2024, 2, 29), 11.0),
        ];
        let quarterly = vec![SeriesPoint::new(d(2023, 12, 31), 9.0)];
        let daily_close = vec![(d(2024, 2, 1), 10.5), (d(2024, 2, 2), 10.7)];
        let figure = close_price_chart(
            &text,
            &daily_close,
            &monthly,
            &forecast_at(Frequency::MonthEnd.advance(d(2024, 2, 29), 1), 12.0),
            &quarterly,
            &forecast_at(d(2024, 3, 31), 9.5),
        );

        assert_eq!(
            figure.trace_names(),
            vec![Some("Mean"), Some("Projection"), Some("Market"), Some("Quarter Projection")]
        );
        assert_eq!(figure.data[0].len(), 3);
        assert_eq!(figure.data[1].x, vec!["2024-02-29", "2024-03-31"]);
        assert_eq!(figure.data[1].y, vec![Some(11.0), Some(12.0)]);
        assert_eq!(figure.data[3].len(), 2);
        assert_eq!(figure.layout.yaxis.unwrap().title.unwrap().text, "$");
    }

    #[test]
    fn test_fallback_chart_only_market() {
        let figure = close_price_fallback_chart(&ChartText::default(), &[(d(2024, 1, 1), 1.0)]);
        assert_eq!(figure.trace_names(), vec![Some("Market")]);
    }

    #[test]
    fn test_rsi_chart_keeps_last_30() {
        let rsi: Vec<_> = (0..40)
            .map(|i| (d(2024, 1, 1) + chrono::Days::new(i), Some(50.0)))
            .collect();
        let figure = rsi_chart(&ChartText::default(), &rsi);
        assert_eq!(figure.data[0].len(), RSI_LOOKBACK);
        assert_eq!(figure.data[0].x[0], "2024-01-11");
        assert_eq!(figure.layout.title.unwrap().text, "RSI 5 days");
    }

    #[test]
    fn test_ichimoku_cloud_masks() {
        let bullish = IchimokuPoint {
            conversion_line: Some(1.0),
            base_line: Some(1.0),
            span_a: Some(3.0),
            span_b: Some(2.0),
        };
        let bearish = IchimokuPoint {
            span_a: Some(1.0),
            ..bullish
        };
        let rows = vec![
            IchimokuRow { date: d(2024, 1, 1), close: 1.0, lines: bullish },
            IchimokuRow { date: d(2024, 1, 2), close: 1.0, lines: bearish },
            IchimokuRow { date: d(2024, 1, 3), close: 1.0, lines: IchimokuPoint::default() },
        ];
        let figure = ichimoku_chart(&ChartText::default(), &rows, &Theme::dark());

        assert_eq!(figure.data.len(), 9);
        assert_eq!(figure.data[6].y, vec![Some(2.0), None, None]);
        assert_eq!(figure.data[8].y, vec![None, Some(2.0), None]);
        assert_eq!(figure.data[6].fillcolor.as_deref(), Some(BULLISH_FILL));
        assert_eq!(figure.data[5].showlegend, Some(false));
        assert_eq!(figure.layout.height, Some(500));
        assert_eq!(figure.layout.paper_bgcolor.as_deref(), Some("#0e1117"));
    }
}
