//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[max(0, i-n+1)..=i])
//! The first n-1 bars average over the bars seen so far, so no bar is invalid.

use crate::domain::indicator::{trailing_mean, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceHistory;

pub fn calculate_sma(history: &PriceHistory, period: usize) -> IndicatorSeries {
    let closes = history.closes();
    let values = history
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: period > 0,
            value: if period > 0 {
                trailing_mean(&closes, i, period)
            } else {
                0.0
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
