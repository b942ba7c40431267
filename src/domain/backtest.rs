//! Bar-by-bar portfolio simulation.
//!
//! BacktestConfig holds the run parameters; `simulate` replays a signal
//! series against a price history and returns the resulting trajectory.

use log::debug;

use super::error::QuantbackError;
use super::execution::{self, Fill};
use super::metrics::PerformanceSummary;
use super::portfolio::{PortfolioSnapshot, PortfolioState};
use super::price::PriceHistory;
use super::signal::{Signal, SignalSeries};
use super::strategy::Strategy;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_POSITION_SIZE_PCT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Percent of initial capital spent per Buy, in (0, 100].
    pub position_size_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            position_size_pct: DEFAULT_POSITION_SIZE_PCT,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), QuantbackError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(QuantbackError::invalid_parameter(
                "initial_capital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 100.0) {
            return Err(QuantbackError::invalid_parameter(
                "position_size_pct",
                format!("must be in (0, 100], got {}", self.position_size_pct),
            ));
        }
        Ok(())
    }

    /// Fixed spend per Buy. Based on initial capital, not current equity.
    pub fn trade_budget(&self) -> f64 {
        self.initial_capital * self.position_size_pct / 100.0
    }
}

/// One snapshot per input bar, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub snapshots: Vec<PortfolioSnapshot>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn total_values(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.total_value).collect()
    }

    pub fn first(&self) -> Option<&PortfolioSnapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&PortfolioSnapshot> {
        self.snapshots.last()
    }
}

pub fn simulate(
    history: &PriceHistory,
    signals: &SignalSeries,
    config: &BacktestConfig,
) -> Result<Trajectory, QuantbackError> {
    config.validate()?;

    let aligned = signals.aligned_to(history);
    let budget = config.trade_budget();
    let mut state = PortfolioState::new(config.initial_capital);
    let mut snapshots = Vec::with_capacity(history.len());

    for (bar, signal) in history.bars().iter().zip(aligned) {
        match execution::apply(&mut state, signal, bar.close, budget) {
            Fill::Bought { shares, cost } => {
                debug!("{}: bought {} @ {:.2} (cost {:.2})", bar.date, shares, bar.close, cost);
            }
            Fill::Sold { shares, proceeds } => {
                debug!(
                    "{}: sold {} @ {:.2} (proceeds {:.2})",
                    bar.date, shares, bar.close, proceeds
                );
            }
            Fill::NoOp(reason) if signal != Signal::Hold => {
                debug!("{}: {} skipped ({:?})", bar.date, signal, reason);
            }
            Fill::NoOp(_) => {}
        }
        snapshots.push(state.snapshot(bar.date, bar.close));
    }

    Ok(Trajectory { snapshots })
}

/// Everything one ticker's run produces.
#[derive(Debug, Clone)]
pub struct TickerResult {
    pub ticker: String,
    pub signals: SignalSeries,
    pub trajectory: Trajectory,
    pub summary: PerformanceSummary,
}

/// Generate signals, simulate and summarize one ticker.
pub fn backtest_ticker(
    ticker: &str,
    history: &PriceHistory,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<TickerResult, QuantbackError> {
    strategy.validate()?;
    let signals = strategy.generate_signals(history);
    let trajectory = simulate(history, &signals, config)?;
    let summary = PerformanceSummary::compute(&trajectory);
    Ok(TickerResult {
        ticker: ticker.to_string(),
        signals,
        trajectory,
        summary,
    })
}
