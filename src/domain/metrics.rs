//! Performance metrics and trade markers derived from a finished trajectory.

use chrono::NaiveDate;

use super::backtest::Trajectory;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction, e.g. -0.25 for a 25% peak-to-trough fall.
    pub max_drawdown: f64,
    pub final_value: f64,
    pub entries: usize,
    pub exits: usize,
}

impl PerformanceSummary {
    pub fn compute(trajectory: &Trajectory) -> Self {
        let values = trajectory.total_values();
        let markers = trade_markers(trajectory);

        PerformanceSummary {
            total_return: compute_total_return(&values),
            sharpe_ratio: compute_sharpe(&values),
            max_drawdown: compute_max_drawdown(&values),
            final_value: values.last().copied().unwrap_or(0.0),
            entries: markers
                .iter()
                .filter(|m| m.kind == MarkerKind::Entry)
                .count(),
            exits: markers.iter().filter(|m| m.kind == MarkerKind::Exit).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Entry,
    Exit,
}

/// A bar where the share count rose (entry) or fell (exit).
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMarker {
    pub index: usize,
    pub date: NaiveDate,
    pub total_value: f64,
    pub kind: MarkerKind,
}

/// Position before the first bar counts as zero.
pub fn trade_markers(trajectory: &Trajectory) -> Vec<TradeMarker> {
    let mut markers = Vec::new();
    let mut prev_position = 0u64;

    for (index, snap) in trajectory.snapshots.iter().enumerate() {
        let kind = if snap.position > prev_position {
            Some(MarkerKind::Entry)
        } else if snap.position < prev_position {
            Some(MarkerKind::Exit)
        } else {
            None
        };
        if let Some(kind) = kind {
            markers.push(TradeMarker {
                index,
                date: snap.date,
                total_value: snap.total_value,
                kind,
            });
        }
        prev_position = snap.position;
    }

    markers
}

fn compute_total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if first != 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Annualized mean/stddev of simple returns, sample stddev (n - 1).
fn compute_sharpe(values: &[f64]) -> f64 {
    let returns = simple_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

fn compute_max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
