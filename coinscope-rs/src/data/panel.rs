//! Wide CSV price panel (one close column per ticker)

use crate::data::{drop_last, pct_change, resample_median, DataError, Frequency, SeriesPoint};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Daily closes for several tickers, read from a CSV with a `Date` column
/// followed by one column per Yahoo ticker (`BTC-USD`, `ETH-USD`, ...).
#[derive(Debug, Clone, Default)]
pub struct PricePanel {
    columns: HashMap<String, Vec<(NaiveDate, f64)>>,
}

impl PricePanel {
    /// Load a panel from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let reader = csv::Reader::from_path(path).map_err(|source| DataError::Csv {
            path: origin.clone(),
            source,
        })?;
        let panel = Self::from_csv(reader, &origin)?;
        info!("Loaded price panel {} with {} tickers", origin, panel.columns.len());
        Ok(panel)
    }

    /// Load a panel from any reader (used by tests and in-memory data)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Self::from_csv(csv::Reader::from_reader(reader), "<memory>")
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, origin: &str) -> Result<Self, DataError> {
        let csv_err = |source| DataError::Csv {
            path: origin.to_string(),
            source,
        };
        let headers = reader.headers().map_err(csv_err)?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h.trim() == "Date")
            .ok_or_else(|| DataError::MissingColumn("Date".to_string()))?;

        let mut columns: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let raw_date = record.get(date_idx).unwrap_or_default().trim();
            let date = parse_date(raw_date).ok_or_else(|| DataError::InvalidDate {
                row: row + 1,
                value: raw_date.to_string(),
            })?;

            for (idx, header) in headers.iter().enumerate() {
                if idx == date_idx {
                    continue;
                }
                // Empty cells are gaps, not zeroes
                let Some(raw) = record.get(idx).map(str::trim).filter(|v| !v.is_empty()) else {
                    continue;
                };
                match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => columns
                        .entry(header.trim().to_string())
                        .or_default()
                        .push((date, value)),
                    _ => debug!("Skipping unparsable value {:?} for {} on {}", raw, header, date),
                }
            }
        }

        for points in columns.values_mut() {
            points.sort_by_key(|(date, _)| *date);
        }
        Ok(Self { columns })
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.columns.contains_key(ticker)
    }

    /// Daily closes of one ticker
    pub fn closes(&self, ticker: &str) -> Option<&[(NaiveDate, f64)]> {
        self.columns.get(ticker).map(Vec::as_slice)
    }

    /// Quarter-over-quarter change of the quarterly median close
    pub fn qoq(&self, ticker: &str) -> Option<Vec<SeriesPoint>> {
        self.closes(ticker).map(qoq_from_daily)
    }
}

/// QoQ % change of quarterly median closes built from daily observations
pub fn qoq_from_daily(points: &[(NaiveDate, f64)]) -> Vec<SeriesPoint> {
    pct_change(&resample_median(points, Frequency::QuarterEnd), 1)
}

/// Quarterly medians with the in-progress quarter removed
pub fn complete_quarters(points: &[(NaiveDate, f64)]) -> Vec<SeriesPoint> {
    drop_last(resample_median(points, Frequency::QuarterEnd))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
