//! CSV file data adapter.
//!
//! Columns are located by header name. `date` (or the first column) holds
//! `YYYY-MM-DD` dates; `close` is required, with `adj close` accepted in its
//! place. `open`, `high`, `low` and `volume` are picked up when present.

use crate::domain::error::QuantbackError;
use crate::domain::price::{Bar, PriceHistory};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const CLOSE_COLUMNS: [&str; 3] = ["close", "adj close", "adj_close"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    /// `path` is either a directory holding `<TICKER>.csv` files or a single
    /// CSV file used for every ticker.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", ticker))
        } else {
            self.path.clone()
        }
    }

    fn read_bars(&self, ticker: &str) -> Result<Vec<Bar>, QuantbackError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Err(QuantbackError::NoData {
                ticker: ticker.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| QuantbackError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        parse_bars(&content, &path)
    }
}

struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, QuantbackError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let close = CLOSE_COLUMNS
            .iter()
            .find_map(|name| find(name))
            .ok_or_else(|| QuantbackError::MissingPriceField {
                field: "close".into(),
                origin: path.display().to_string(),
            })?;

        Ok(Columns {
            date: find("date").unwrap_or(0),
            close,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

fn parse_bars(content: &str, path: &Path) -> Result<Vec<Bar>, QuantbackError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers().map_err(|e| QuantbackError::Data {
        reason: format!("CSV header error in {}: {}", path.display(), e),
    })?;
    let columns = Columns::from_headers(headers, path)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| QuantbackError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(columns.date).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            QuantbackError::Data {
                reason: format!("row {}: invalid date '{}': {}", row + 1, date_str, e),
            }
        })?;

        let close = parse_required(&record, columns.close, "close", row)?;
        let open = parse_optional(&record, columns.open, "open", row)?;
        let high = parse_optional(&record, columns.high, "high", row)?;
        let low = parse_optional(&record, columns.low, "low", row)?;
        let volume = parse_optional::<f64>(&record, columns.volume, "volume", row)?
            .map(|v| v as i64);

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

fn parse_required(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, QuantbackError> {
    parse_optional(record, Some(index), name, row)?.ok_or_else(|| QuantbackError::Data {
        reason: format!("row {}: missing {} value", row + 1, name),
    })
}

fn parse_optional<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: Option<usize>,
    name: &str,
    row: usize,
) -> Result<Option<T>, QuantbackError>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = index.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e| QuantbackError::Data {
        reason: format!("row {}: invalid {} value '{}': {}", row + 1, name, raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceHistory, QuantbackError> {
        let mut bars: Vec<Bar> = self
            .read_bars(ticker)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        bars.sort_by_key(|b| b.date);
        PriceHistory::new(bars)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantbackError> {
        let bars = self.read_bars(ticker)?;
        let min = bars.iter().map(|b| b.date).min();
        let max = bars.iter().map(|b| b.date).max();
        Ok(min.zip(max).map(|(min, max)| (min, max, bars.len())))
    }
}
