//! Configuration validation.
//!
//! Checks every `[backtest]`, `[strategy]` and `[data]` field before any
//! price data is read. Absent optional keys fall back to their defaults.

use crate::domain::error::QuantbackError;
use crate::domain::strategy::{
    StrategyKind, DEFAULT_LONG_WINDOW, DEFAULT_RSI_PERIOD, DEFAULT_SHORT_WINDOW,
    DEFAULT_THRESHOLD_HIGH, DEFAULT_THRESHOLD_LOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataSourceKind;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    validate_initial_capital(config)?;
    validate_position_size(config)?;
    validate_dates(config)?;
    validate_tickers(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    let kind = match config.get_string("strategy", "type") {
        Some(s) if !s.trim().is_empty() => s.parse::<StrategyKind>()?,
        _ => {
            return Err(QuantbackError::ConfigMissing {
                section: "strategy".to_string(),
                key: "type".to_string(),
            })
        }
    };

    match kind {
        StrategyKind::SmaCrossover => {
            validate_window(config, "short_window", DEFAULT_SHORT_WINDOW)?;
            validate_window(config, "long_window", DEFAULT_LONG_WINDOW)?;
        }
        StrategyKind::Rsi => {
            validate_window(config, "rsi_period", DEFAULT_RSI_PERIOD)?;
            validate_thresholds(config)?;
        }
        StrategyKind::BuyAndHold => {}
    }
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    if let Some(source) = config.get_string("data", "source") {
        source
            .parse::<DataSourceKind>()
            .map_err(|reason| QuantbackError::ConfigInvalid {
                section: "data".to_string(),
                key: "source".to_string(),
                reason,
            })?;
    }
    match config.get_string("data", "csv_path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(QuantbackError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_path".to_string(),
        }),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    if let Some(value) = config.get_double("backtest", "initial_capital")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(QuantbackError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: "initial_capital must be positive".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    if let Some(value) = config.get_double("backtest", "position_size_pct")? {
        if !(value > 0.0 && value <= 100.0) {
            return Err(QuantbackError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "position_size_pct".to_string(),
                reason: "position_size_pct must be in (0, 100]".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date > end_date {
        return Err(QuantbackError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

/// Reads a required `[backtest]` date in `YYYY-MM-DD` form.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, QuantbackError> {
    match config.get_string("backtest", field) {
        None => Err(QuantbackError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
            QuantbackError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    let tickers = config.get_list("backtest", "tickers");
    let ticker = config.get_list("backtest", "ticker");
    if tickers.is_empty() && ticker.is_empty() {
        return Err(QuantbackError::ConfigMissing {
            section: "backtest".to_string(),
            key: "tickers".to_string(),
        });
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<(), QuantbackError> {
    let value = config.get_usize("strategy", key)?.unwrap_or(default);
    if value < 1 {
        return Err(QuantbackError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least 1", key),
        });
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), QuantbackError> {
    let low = config
        .get_double("strategy", "threshold_low")?
        .unwrap_or(DEFAULT_THRESHOLD_LOW);
    let high = config
        .get_double("strategy", "threshold_high")?
        .unwrap_or(DEFAULT_THRESHOLD_HIGH);

    for (key, value) in [("threshold_low", low), ("threshold_high", high)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(QuantbackError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{} must be between 0 and 100", key),
            });
        }
    }
    if low > high {
        return Err(QuantbackError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "threshold_low".to_string(),
            reason: "threshold_low must not exceed threshold_high".to_string(),
        });
    }
    Ok(())
}
