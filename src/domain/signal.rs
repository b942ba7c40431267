//! Discrete trade signals and their alignment to a price history.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use super::error::QuantbackError;
use super::price::PriceHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedSignal {
    pub date: NaiveDate,
    pub signal: Signal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSeries {
    pub values: Vec<TimedSignal>,
}

impl SignalSeries {
    pub fn new(values: Vec<TimedSignal>) -> Self {
        SignalSeries { values }
    }

    /// Pairs each bar of `history` with the signal in `signals` at the same index.
    ///
    /// Fails unless there is exactly one signal per bar.
    pub fn from_history(
        history: &PriceHistory,
        signals: Vec<Signal>,
    ) -> Result<Self, QuantbackError> {
        if signals.len() != history.len() {
            return Err(QuantbackError::invalid_parameter(
                "signals",
                format!("{} signals for {} bars", signals.len(), history.len()),
            ));
        }
        Ok(Self::zip_dates(history, signals))
    }

    /// Callers guarantee one signal per bar.
    pub(crate) fn zip_dates(history: &PriceHistory, signals: Vec<Signal>) -> Self {
        SignalSeries {
            values: history
                .bars()
                .iter()
                .zip(signals)
                .map(|(bar, signal)| TimedSignal {
                    date: bar.date,
                    signal,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.values.iter().map(|v| v.signal)
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.signals().filter(|&s| s == signal).count()
    }

    /// One signal per bar of `history`, matched by date.
    ///
    /// Bars with no entry in the series are `Hold`; entries dated outside the
    /// history are dropped. If a date appears twice the later entry wins.
    pub fn aligned_to(&self, history: &PriceHistory) -> Vec<Signal> {
        let by_date: HashMap<NaiveDate, Signal> =
            self.values.iter().map(|v| (v.date, v.signal)).collect();
        history
            .bars()
            .iter()
            .map(|bar| by_date.get(&bar.date).copied().unwrap_or_default())
            .collect()
    }
}
