//! Console report adapter: metrics table on stderr, trajectories as CSV on stdout.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::{self, Write};

use crate::domain::backtest::TickerResult;
use crate::domain::error::QuantbackError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Default)]
pub struct ConsoleReport {
    /// Also emit every trajectory as CSV.
    pub include_trajectory: bool,
}

impl ConsoleReport {
    pub fn new(include_trajectory: bool) -> Self {
        ConsoleReport { include_trajectory }
    }

    pub fn render_summary(results: &[TickerResult], strategy: &Strategy) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n=== {} ===\n", strategy));
        for r in results {
            let s = &r.summary;
            out.push_str(&format!("{}\n", r.ticker));
            out.push_str(&format!("  Return:        {:.2}%\n", s.total_return * 100.0));
            out.push_str(&format!("  Sharpe:        {:.2}\n", s.sharpe_ratio));
            out.push_str(&format!("  Max Drawdown:  {:.2}%\n", s.max_drawdown * 100.0));
            out.push_str(&format!("  Final Value:   {:.2}\n", s.final_value));
            out.push_str(&format!("  Entries/Exits: {}/{}\n", s.entries, s.exits));
        }
        out
    }

    /// Header `ticker,date,price,cash,position,total_value`, one row per bar.
    pub fn write_trajectories_csv<W: Write>(
        writer: W,
        results: &[TickerResult],
    ) -> Result<(), QuantbackError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for r in results {
            for snap in &r.trajectory.snapshots {
                wtr.serialize(TrajectoryRow {
                    ticker: &r.ticker,
                    date: snap.date,
                    price: snap.price,
                    cash: snap.cash,
                    position: snap.position,
                    total_value: snap.total_value,
                })
                .map_err(csv_error)?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct TrajectoryRow<'a> {
    ticker: &'a str,
    date: NaiveDate,
    price: f64,
    cash: f64,
    position: u64,
    total_value: f64,
}

fn csv_error(e: csv::Error) -> QuantbackError {
    QuantbackError::Data {
        reason: format!("failed to write CSV: {}", e),
    }
}

impl ReportPort for ConsoleReport {
    fn write(&self, results: &[TickerResult], strategy: &Strategy) -> Result<(), QuantbackError> {
        eprint!("{}", Self::render_summary(results, strategy));

        if self.include_trajectory {
            Self::write_trajectories_csv(io::stdout().lock(), results)?;
        }
        Ok(())
    }
}
