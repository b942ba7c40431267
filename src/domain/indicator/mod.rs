//! Technical indicators over closing prices.
//!
//! - `IndicatorPoint`: a single dated value
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: one point per input bar
//!
//! Both indicators average over however many bars are available until the
//! window fills, so every bar after warmup carries a value.

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, `None` when out of range or not yet valid.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Mean of `values[i + 1 - period..=i]`, shrinking the window at the start.
pub(crate) fn trailing_mean(values: &[f64], i: usize, period: usize) -> f64 {
    let start = (i + 1).saturating_sub(period);
    let window = &values[start..=i];
    window.iter().sum::<f64>() / window.len() as f64
}
