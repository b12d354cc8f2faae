//! Default date windows for the dashboard screens

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Deserialize;

/// Screen the window is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    StockPrice,
    Economic,
    Fund,
}

/// View selected inside a screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum View {
    #[default]
    Market,
    /// Needs an extra year so two full seasons are available
    #[serde(rename = "Seasonality and Trend")]
    SeasonalityAndTrend,
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Replace either bound with a user choice
    pub fn with_overrides(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.unwrap_or(self.start),
            end: end.unwrap_or(self.end),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// First day of the month `offset` months away from (`year`, `month`)
fn shifted_month(year: i32, month: u32, offset: i32) -> NaiveDate {
    let base = first_of_month(year, month);
    let shifted = if offset >= 0 {
        base.checked_add_months(Months::new(offset as u32))
    } else {
        base.checked_sub_months(Months::new(offset.unsigned_abs()))
    };
    shifted.unwrap_or(base)
}

/// Default analysis window for a screen, relative to `today`.
///
/// * forecast: the next twelve months, first of next month to first of the
///   same month a year on
/// * stock price: three years back to today
/// * economic: previous month a year ago to two months back
/// * fund: previous month a year ago to last month
///
/// The seasonality view reaches one more year back.
pub fn date_interval(screen: Screen, view: View, forecast: bool, today: NaiveDate) -> DateWindow {
    let year = today.year();
    let month = today.month();

    if forecast {
        return DateWindow {
            start: shifted_month(year, month, 1),
            end: shifted_month(year + 1, month, 0),
        };
    }

    let extra_year = u64::from(view == View::SeasonalityAndTrend);
    let last_year = year - 1 - extra_year as i32;

    match screen {
        Screen::StockPrice => DateWindow {
            start: today - Days::new(365 * (3 + extra_year)),
            end: today,
        },
        Screen::Economic => DateWindow {
            start: shifted_month(last_year, month, -1),
            end: shifted_month(year, month, -2),
        },
        Screen::Fund => DateWindow {
            start: shifted_month(last_year, month, -1),
            end: shifted_month(year, month, -1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_stock_price_window() {
        let window = date_interval(Screen::StockPrice, View::Market, false, d(2024, 6, 15));
        assert_eq!(window.start, d(2021, 6, 16));
        assert_eq!(window.end, d(2024, 6, 15));
    }

    #[test]
    fn test_seasonality_adds_a_year() {
        let window = date_interval(Screen::StockPrice, View::SeasonalityAndTrend, false, d(2024, 6, 15));
        assert_eq!(window.start, d(2020, 6, 16));
    }

    #[test]
    fn test_forecast_window_wraps_december() {
        let window = date_interval(Screen::StockPrice, View::Market, true, d(2024, 12, 5));
        assert_eq!(window.start, d(2025, 1, 1));
        assert_eq!(window.end, d(2025, 12, 1));
    }

    #[test]
    fn test_economic_window_in_january() {
        let window = date_interval(Screen::Economic, View::Market, false, d(2024, 1, 20));
        assert_eq!(window.start, d(2022, 12, 1));
        assert_eq!(window.end, d(2023, 11, 1));
    }

    #[test]
    fn test_fund_window() {
        let window = date_interval(Screen::Fund, View::Market, false, d(2024, 5, 2));
        assert_eq!(window.start, d(2023, 4, 1));
        assert_eq!(window.end, d(2024, 4, 1));
    }

    #[test]
    fn test_overrides() {
        let window = date_interval(Screen::StockPrice, View::Market, false, d(2024, 6, 15))
            .with_overrides(Some(d(2024, 1, 1)), None);
        assert_eq!(window.start, d(2024, 1, 1));
        assert_eq!(window.end, d(2024, 6, 15));
        assert!(window.is_valid());
    }
}
