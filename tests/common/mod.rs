#![allow(dead_code)]

use chrono::NaiveDate;
use quantback::domain::backtest::{BacktestConfig, TickerResult};
use quantback::domain::error::QuantbackError;
use quantback::domain::price::{Bar, PriceHistory};
use quantback::domain::strategy::Strategy;
use quantback::ports::data_port::DataPort;
use quantback::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub missing_close: Vec<String>,
    pub missing: Vec<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            missing_close: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_missing_close(mut self, ticker: &str) -> Self {
        self.missing_close.push(ticker.to_string());
        self
    }

    /// Behaves like a ticker with no data file.
    pub fn with_missing(mut self, ticker: &str) -> Self {
        self.missing.push(ticker.to_string());
        self
    }

    fn check(&self, ticker: &str) -> Result<(), QuantbackError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(QuantbackError::Data {
                reason: reason.clone(),
            });
        }
        if self.missing.iter().any(|t| t == ticker) {
            return Err(QuantbackError::NoData {
                ticker: ticker.to_string(),
            });
        }
        if self.missing_close.iter().any(|t| t == ticker) {
            return Err(QuantbackError::MissingPriceField {
                field: "close".into(),
                origin: format!("{}.csv", ticker),
            });
        }
        Ok(())
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceHistory, QuantbackError> {
        self.check(ticker)?;
        let bars = self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        PriceHistory::new(bars)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantbackError> {
        self.check(ticker)?;
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

/// Records every `write` call instead of printing.
pub struct MockReportPort {
    pub calls: RefCell<Vec<(Vec<TickerResult>, Strategy)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, results: &[TickerResult], strategy: &Strategy) -> Result<(), QuantbackError> {
        self.calls
            .borrow_mut()
            .push((results.to_vec(), strategy.clone()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily bars starting 2024-01-01.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::from_close(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn make_history(closes: &[f64]) -> PriceHistory {
    PriceHistory::new(make_bars(closes)).unwrap()
}

/// Linear ramp of `count` closes from `start_price` in steps of `step`.
pub fn ramp(count: usize, start_price: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + step * i as f64).collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_capital: 10_000.0,
        position_size_pct: 10.0,
    }
}
