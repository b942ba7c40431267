//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::ConsoleReport;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::DataSource;
use crate::domain::backtest::{
    backtest_ticker, BacktestConfig, TickerResult, DEFAULT_INITIAL_CAPITAL,
    DEFAULT_POSITION_SIZE_PCT,
};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_data_config, validate_strategy_config,
};
use crate::domain::error::QuantbackError;
use crate::domain::strategy::{
    Strategy, StrategyKind, DEFAULT_LONG_WINDOW, DEFAULT_RSI_PERIOD, DEFAULT_SHORT_WINDOW,
    DEFAULT_THRESHOLD_HIGH, DEFAULT_THRESHOLD_LOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, DataSourceKind};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantback", about = "Single-asset strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single ticker instead of the configured list
        #[arg(long)]
        ticker: Option<String>,
        /// Override `[strategy] type`
        #[arg(short, long)]
        strategy: Option<String>,
        /// Write each trajectory as CSV to stdout
        #[arg(long)]
        trajectory: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show data range for ticker(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
}

/// Everything a backtest run needs, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub backtest: BacktestConfig,
    pub strategy: Strategy,
    pub data_source: DataSource,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            ticker,
            strategy,
            trajectory,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, ticker.as_deref(), strategy.as_deref())
            } else {
                run_backtest(&config, ticker.as_deref(), strategy.as_deref(), trajectory)
            }
        }
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, QuantbackError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn run_backtest(
    config_path: &Path,
    ticker_override: Option<&str>,
    strategy_override: Option<&str>,
    include_trajectory: bool,
) -> Result<(), QuantbackError> {
    let adapter = load_config(config_path)?;
    let run = build_run_config(&adapter, ticker_override, strategy_override)?;
    info!("Strategy: {}", run.strategy);

    let data_port = run.data_source.open()?;
    let report = ConsoleReport::new(include_trajectory);
    run_backtest_pipeline(data_port.as_ref(), &report, &run)?;
    Ok(())
}

/// Validates every section, then resolves tickers, dates, sizing, strategy
/// and data source. No price data is read.
pub fn build_run_config(
    config: &dyn ConfigPort,
    ticker_override: Option<&str>,
    strategy_override: Option<&str>,
) -> Result<RunConfig, QuantbackError> {
    validate_backtest_config(config)?;
    if strategy_override.is_none() {
        validate_strategy_config(config)?;
    }
    validate_data_config(config)?;

    let backtest = build_backtest_config(config)?;
    backtest.validate()?;
    let strategy = build_strategy(config, strategy_override)?;
    strategy.validate()?;

    Ok(RunConfig {
        tickers: resolve_tickers(ticker_override, config),
        start_date: parse_date(config, "start_date")?,
        end_date: parse_date(config, "end_date")?,
        backtest,
        strategy,
        data_source: build_data_source(config)?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, QuantbackError> {
    Ok(BacktestConfig {
        initial_capital: config
            .get_double("backtest", "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CAPITAL),
        position_size_pct: config
            .get_double("backtest", "position_size_pct")?
            .unwrap_or(DEFAULT_POSITION_SIZE_PCT),
    })
}

/// `name_override` replaces `[strategy] type`; parameters still come from
/// the `[strategy]` section.
pub fn build_strategy(
    config: &dyn ConfigPort,
    name_override: Option<&str>,
) -> Result<Strategy, QuantbackError> {
    let name = match name_override {
        Some(n) => n.to_string(),
        None => config
            .get_string("strategy", "type")
            .ok_or_else(|| QuantbackError::ConfigMissing {
                section: "strategy".into(),
                key: "type".into(),
            })?,
    };

    let strategy = match name.parse::<StrategyKind>()? {
        StrategyKind::SmaCrossover => Strategy::SmaCrossover {
            short_window: config
                .get_usize("strategy", "short_window")?
                .unwrap_or(DEFAULT_SHORT_WINDOW),
            long_window: config
                .get_usize("strategy", "long_window")?
                .unwrap_or(DEFAULT_LONG_WINDOW),
        },
        StrategyKind::Rsi => Strategy::Rsi {
            period: config
                .get_usize("strategy", "rsi_period")?
                .unwrap_or(DEFAULT_RSI_PERIOD),
            threshold_low: config
                .get_double("strategy", "threshold_low")?
                .unwrap_or(DEFAULT_THRESHOLD_LOW),
            threshold_high: config
                .get_double("strategy", "threshold_high")?
                .unwrap_or(DEFAULT_THRESHOLD_HIGH),
        },
        StrategyKind::BuyAndHold => Strategy::BuyAndHold,
    };
    Ok(strategy)
}

pub fn build_data_source(config: &dyn ConfigPort) -> Result<DataSource, QuantbackError> {
    let kind = match config.get_string("data", "source") {
        Some(s) => s
            .parse::<DataSourceKind>()
            .map_err(|reason| QuantbackError::ConfigInvalid {
                section: "data".into(),
                key: "source".into(),
                reason,
            })?,
        None => DataSourceKind::Csv,
    };
    let path = config
        .get_string("data", "csv_path")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| QuantbackError::ConfigMissing {
            section: "data".into(),
            key: "csv_path".into(),
        })?;
    Ok(DataSource::new(kind, PathBuf::from(path)))
}

/// Fetches, backtests and reports every ticker in `run`, in order.
///
/// Tickers with no data file or no bars in range are skipped with a
/// warning. Unreadable or malformed data fails the run.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    run: &RunConfig,
) -> Result<Vec<TickerResult>, QuantbackError> {
    info!(
        "Running backtest: {} tickers, {} to {}",
        run.tickers.len(),
        run.start_date,
        run.end_date
    );

    let mut results = Vec::with_capacity(run.tickers.len());
    for ticker in &run.tickers {
        let history = match data_port.fetch_history(ticker, run.start_date, run.end_date) {
            Ok(h) => h,
            Err(e @ QuantbackError::NoData { .. }) => {
                warn!("skipping {} ({})", ticker, e);
                continue;
            }
            Err(e) => return Err(e),
        };
        if history.is_empty() {
            warn!(
                "skipping {} (no bars between {} and {})",
                ticker, run.start_date, run.end_date
            );
            continue;
        }

        info!("  {}: {} bars", ticker, history.len());
        results.push(backtest_ticker(ticker, &history, &run.strategy, &run.backtest)?);
    }

    if results.is_empty() {
        return Err(QuantbackError::NoData {
            ticker: run.tickers.join(", "),
        });
    }

    report.write(&results, &run.strategy)?;
    Ok(results)
}

pub fn run_dry_run(
    config_path: &Path,
    ticker_override: Option<&str>,
    strategy_override: Option<&str>,
) -> Result<(), QuantbackError> {
    let adapter = load_config(config_path)?;
    let run = build_run_config(&adapter, ticker_override, strategy_override)?;
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy:");
    eprintln!("  {}", run.strategy);
    eprintln!("\nBacktest:");
    eprintln!("  period:          {} to {}", run.start_date, run.end_date);
    eprintln!("  initial capital: {:.2}", run.backtest.initial_capital);
    eprintln!(
        "  position size:   {}% ({:.2} per buy)",
        run.backtest.position_size_pct,
        run.backtest.trade_budget()
    );
    eprintln!("  tickers:         {}", run.tickers.join(", "));

    match &run.data_source {
        DataSource::Csv { path } => eprintln!("\nData:\n  csv: {}", path.display()),
    }

    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_info(config_path: &Path, ticker_override: Option<&str>) -> Result<(), QuantbackError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;

    let tickers = resolve_tickers(ticker_override, &adapter);
    if tickers.is_empty() {
        return Err(QuantbackError::ConfigMissing {
            section: "backtest".into(),
            key: "tickers".into(),
        });
    }

    let data_port = build_data_source(&adapter)?.open()?;
    for ticker in &tickers {
        match data_port.get_data_range(ticker) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", ticker, count, first, last);
            }
            Ok(None) | Err(QuantbackError::NoData { .. }) => {
                eprintln!("{}: no data found", ticker)
            }
            Err(e) => eprintln!("error querying {}: {}", ticker, e),
        }
    }
    Ok(())
}

/// `--ticker` wins; otherwise `[backtest] tickers`, then `[backtest] ticker`.
pub fn resolve_tickers(ticker_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(t) = ticker_override {
        let t = t.trim();
        return if t.is_empty() { vec![] } else { vec![t.to_string()] };
    }

    let tickers = config.get_list("backtest", "tickers");
    if !tickers.is_empty() {
        return tickers;
    }
    config.get_list("backtest", "ticker")
}
