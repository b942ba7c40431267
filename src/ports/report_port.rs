//! Report generation port trait.

use crate::domain::backtest::TickerResult;
use crate::domain::error::QuantbackError;
use crate::domain::strategy::Strategy;

/// Consumer of finished backtest results.
pub trait ReportPort {
    fn write(&self, results: &[TickerResult], strategy: &Strategy) -> Result<(), QuantbackError>;
}
