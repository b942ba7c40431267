//! Price-history access port trait.

use crate::domain::error::QuantbackError;
use crate::domain::price::PriceHistory;
use chrono::NaiveDate;
use std::str::FromStr;

pub trait DataPort {
    /// Bars for `ticker` dated within `[start_date, end_date]`.
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceHistory, QuantbackError>;

    /// First date, last date and bar count of everything available for `ticker`.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, QuantbackError>;
}

/// Source name as written in `[data] source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Csv,
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "csv file" | "csv_file" => Ok(DataSourceKind::Csv),
            other => Err(format!("unsupported data source '{}' (expected csv)", other)),
        }
    }
}
