//! RSI (Relative Strength Index) over simple trailing averages.
//!
//! - change[i] = C[i] - C[i-1] for i >= 1
//! - avg_gain / avg_loss: mean of the last n gains / losses, fewer at the start
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! A zero avg_loss is replaced by `LOSS_FLOOR`, so an all-gain window reads
//! just under 100 and a flat window reads 0.
//!
//! Warmup: bar 0 has no price change and is invalid.

use crate::domain::indicator::{trailing_mean, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceHistory;

pub const LOSS_FLOOR: f64 = 1e-10;

pub fn calculate_rsi(history: &PriceHistory, period: usize) -> IndicatorSeries {
    let bars = history.bars();
    let mut values = Vec::with_capacity(bars.len());

    if period == 0 || bars.is_empty() {
        values.extend(bars.iter().map(|b| IndicatorPoint {
            date: b.date,
            valid: false,
            value: 0.0,
        }));
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    values.push(IndicatorPoint {
        date: bars[0].date,
        valid: false,
        value: 0.0,
    });

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let avg_gain = trailing_mean(&gains, i - 1, period);
        let mut avg_loss = trailing_mean(&losses, i - 1, period);
        if avg_loss == 0.0 {
            avg_loss = LOSS_FLOOR;
        }
        let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: rsi,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
