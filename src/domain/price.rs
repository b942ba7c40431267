//! Daily bars and the validated price history consumed by strategies and the simulator.

use chrono::NaiveDate;

use super::error::QuantbackError;

/// One timestamped price observation. Only `close` is consumed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

impl Bar {
    /// A bar carrying only a closing price.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Bar {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Bars strictly increasing by date, every close positive and finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    bars: Vec<Bar>,
}

impl PriceHistory {
    pub fn new(bars: Vec<Bar>) -> Result<Self, QuantbackError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(QuantbackError::InvalidHistory {
                    date: bar.date,
                    reason: format!("close must be positive, got {}", bar.close),
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                let reason = if bar.date == bars[i - 1].date {
                    "duplicate date"
                } else {
                    "dates out of order"
                };
                return Err(QuantbackError::InvalidHistory {
                    date: bar.date,
                    reason: reason.into(),
                });
            }
        }
        Ok(PriceHistory { bars })
    }

    /// Convenience constructor from `(date, close)` pairs.
    pub fn from_closes<I>(closes: I) -> Result<Self, QuantbackError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            closes
                .into_iter()
                .map(|(date, close)| Bar::from_close(date, close))
                .collect(),
        )
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
