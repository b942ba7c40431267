//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_adapter;
pub mod file_config_adapter;

use std::path::PathBuf;

use crate::domain::error::QuantbackError;
use crate::ports::data_port::{DataPort, DataSourceKind};
use csv_adapter::CsvAdapter;

/// Where price histories come from, chosen per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv { path: PathBuf },
}

impl DataSource {
    pub fn new(kind: DataSourceKind, path: PathBuf) -> Self {
        match kind {
            DataSourceKind::Csv => DataSource::Csv { path },
        }
    }

    pub fn open(&self) -> Result<Box<dyn DataPort>, QuantbackError> {
        match self {
            DataSource::Csv { path } => {
                if !path.exists() {
                    return Err(QuantbackError::Data {
                        reason: format!("csv_path {} does not exist", path.display()),
                    });
                }
                Ok(Box::new(CsvAdapter::new(path.clone())))
            }
        }
    }
}
