//! Calendar resampling and period-over-period change

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar bucket used when resampling daily data.
///
/// Buckets are labelled with their last calendar day, so March 2024 becomes
/// `2024-03-31` and Q1 2024 becomes `2024-03-31` too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    MonthEnd,
    QuarterEnd,
}

impl Frequency {
    /// Months covered by one bucket
    pub fn months(self) -> u32 {
        match self {
            Frequency::MonthEnd => 1,
            Frequency::QuarterEnd => 3,
        }
    }

    /// Buckets per year, used as the seasonal lag
    pub fn season_length(self) -> usize {
        match self {
            Frequency::MonthEnd => 12,
            Frequency::QuarterEnd => 4,
        }
    }

    /// Period-end label of the bucket containing `date`
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        let last_month = match self {
            Frequency::MonthEnd => date.month(),
            Frequency::QuarterEnd => (date.month0() / 3) * 3 + 3,
        };
        month_end(date.year(), last_month)
    }

    /// Period-end label `steps` buckets after `date`'s bucket
    pub fn advance(self, date: NaiveDate, steps: u32) -> NaiveDate {
        let end = self.period_end(date);
        let first = NaiveDate::from_ymd_opt(end.year(), end.month(), 1).unwrap_or(end);
        let shifted = first
            .checked_add_months(Months::new(self.months() * steps))
            .unwrap_or(first);
        month_end(shifted.year(), shifted.month())
    }
}

/// Last calendar day of `month` in `year`
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// A dated value, one row of a resampled or derived series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Median of a slice; `None` when empty or when every value is NaN
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Group dated values into calendar buckets and take the median of each.
///
/// Output is ordered by bucket date. Buckets without observations are
/// skipped; run the result through [`fill_gaps`] when a regular series is
/// needed.
pub fn resample_median(points: &[(NaiveDate, f64)], frequency: Frequency) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for &(date, value) in points {
        buckets
            .entry(frequency.period_end(date))
            .or_default()
            .push(value);
    }

    buckets
        .into_iter()
        .filter_map(|(date, values)| median(&values).map(|v| SeriesPoint::new(date, v)))
        .collect()
}

/// Make a resampled series regular by carrying the previous value into
/// every missing period end.
///
/// Seasonal lags count rows, so a skipped month would otherwise pair each
/// value with the wrong month a year earlier.
pub fn fill_gaps(series: &[SeriesPoint], frequency: Frequency) -> Vec<SeriesPoint> {
    let mut filled: Vec<SeriesPoint> = Vec::with_capacity(series.len());
    for &point in series {
        while let Some(prev) = filled.last().copied() {
            let next = frequency.advance(prev.date, 1);
            if next >= point.date {
                break;
            }
            filled.push(SeriesPoint::new(next, prev.value));
        }
        filled.push(point);
    }
    filled
}

/// Drop the trailing bucket, which is usually still in progress
pub fn drop_last(mut series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    series.pop();
    series
}

/// Percentage change against the value `periods` rows earlier, times 100.
///
/// The first `periods` rows have nothing to compare against and are left
/// out, as is any row whose reference value is zero.
pub fn pct_change(series: &[SeriesPoint], periods: usize) -> Vec<SeriesPoint> {
    if periods == 0 {
        return Vec::new();
    }
    series
        .windows(periods + 1)
        .filter_map(|w| {
            let prev = w[0].value;
            let cur = w[periods];
            (prev != 0.0).then(|| SeriesPoint::new(cur.date, (cur.value - prev) / prev * 100.0))
        })
        .collect()
}

/// Rows whose date falls inside `[start, end]`
pub fn within(series: &[SeriesPoint], start: NaiveDate, end: NaiveDate) -> Vec<SeriesPoint> {
    series
        .iter()
        .filter(|p| (start..=end).contains(&p.date))
        .copied()
        .collect()
}
