//! Signal-generating strategies.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::QuantbackError;
use super::indicator::rsi::calculate_rsi;
use super::indicator::sma::calculate_sma;
use super::price::PriceHistory;
use super::signal::{Signal, SignalSeries};

pub const DEFAULT_SHORT_WINDOW: usize = 10;
pub const DEFAULT_LONG_WINDOW: usize = 30;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_THRESHOLD_LOW: f64 = 30.0;
pub const DEFAULT_THRESHOLD_HIGH: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Buy when the short SMA moves above the long SMA, sell when it moves below.
    SmaCrossover {
        short_window: usize,
        long_window: usize,
    },
    /// Buy while RSI is under `threshold_low`, sell while it is over `threshold_high`.
    Rsi {
        period: usize,
        threshold_low: f64,
        threshold_high: f64,
    },
    BuyAndHold,
}

/// Strategy family without parameters, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    SmaCrossover,
    Rsi,
    BuyAndHold,
}

impl FromStr for StrategyKind {
    type Err = QuantbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "sma_crossover" | "sma" | "crossover" => Ok(StrategyKind::SmaCrossover),
            "rsi" => Ok(StrategyKind::Rsi),
            "buy_and_hold" | "buy_&_hold" | "buyandhold" => Ok(StrategyKind::BuyAndHold),
            _ => Err(QuantbackError::UnknownStrategy {
                name: s.trim().to_string(),
            }),
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::SmaCrossover { .. } => StrategyKind::SmaCrossover,
            Strategy::Rsi { .. } => StrategyKind::Rsi,
            Strategy::BuyAndHold => StrategyKind::BuyAndHold,
        }
    }

    pub fn validate(&self) -> Result<(), QuantbackError> {
        match *self {
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => {
                if short_window == 0 {
                    return Err(QuantbackError::invalid_parameter(
                        "short_window",
                        "must be at least 1",
                    ));
                }
                if long_window == 0 {
                    return Err(QuantbackError::invalid_parameter(
                        "long_window",
                        "must be at least 1",
                    ));
                }
            }
            Strategy::Rsi {
                period,
                threshold_low,
                threshold_high,
            } => {
                if period == 0 {
                    return Err(QuantbackError::invalid_parameter(
                        "rsi_period",
                        "must be at least 1",
                    ));
                }
                if !(0.0..=100.0).contains(&threshold_low) {
                    return Err(QuantbackError::invalid_parameter(
                        "threshold_low",
                        "must be between 0 and 100",
                    ));
                }
                if !(0.0..=100.0).contains(&threshold_high) {
                    return Err(QuantbackError::invalid_parameter(
                        "threshold_high",
                        "must be between 0 and 100",
                    ));
                }
                if threshold_low > threshold_high {
                    return Err(QuantbackError::invalid_parameter(
                        "threshold_low",
                        "must not exceed threshold_high",
                    ));
                }
            }
            Strategy::BuyAndHold => {}
        }
        Ok(())
    }

    /// One signal per bar of `history`. An empty history yields an empty series.
    pub fn generate_signals(&self, history: &PriceHistory) -> SignalSeries {
        let signals = match *self {
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => sma_crossover_signals(history, short_window, long_window),
            Strategy::Rsi {
                period,
                threshold_low,
                threshold_high,
            } => rsi_signals(history, period, threshold_low, threshold_high),
            Strategy::BuyAndHold => buy_and_hold_signals(history),
        };
        SignalSeries::zip_dates(history, signals)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => write!(f, "SMA Crossover ({}/{})", short_window, long_window),
            Strategy::Rsi {
                period,
                threshold_low,
                threshold_high,
            } => write!(f, "RSI({}) {}/{}", period, threshold_low, threshold_high),
            Strategy::BuyAndHold => write!(f, "Buy & Hold"),
        }
    }
}

fn sma_crossover_signals(
    history: &PriceHistory,
    short_window: usize,
    long_window: usize,
) -> Vec<Signal> {
    let short = calculate_sma(history, short_window);
    let long = calculate_sma(history, long_window);

    // Below < Equal < Above; only a change of order emits a signal.
    let order: Vec<Ordering> = short
        .values
        .iter()
        .zip(&long.values)
        .map(|(s, l)| s.value.partial_cmp(&l.value).unwrap_or(Ordering::Equal))
        .collect();

    let mut signals = Vec::with_capacity(order.len());
    if !order.is_empty() {
        signals.push(Signal::Hold);
    }
    for pair in order.windows(2) {
        signals.push(match pair[1].cmp(&pair[0]) {
            Ordering::Greater => Signal::Buy,
            Ordering::Less => Signal::Sell,
            Ordering::Equal => Signal::Hold,
        });
    }
    signals
}

fn rsi_signals(
    history: &PriceHistory,
    period: usize,
    threshold_low: f64,
    threshold_high: f64,
) -> Vec<Signal> {
    calculate_rsi(history, period)
        .values
        .iter()
        .map(|point| {
            if !point.valid {
                Signal::Hold
            } else if point.value < threshold_low {
                Signal::Buy
            } else if point.value > threshold_high {
                Signal::Sell
            } else {
                Signal::Hold
            }
        })
        .collect()
}

fn buy_and_hold_signals(history: &PriceHistory) -> Vec<Signal> {
    (0..history.len())
        .map(|i| if i == 0 { Signal::Buy } else { Signal::Hold })
        .collect()
}
