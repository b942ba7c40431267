//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quantback.
#[derive(Debug, thiserror::Error)]
pub enum QuantbackError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{origin} has no '{field}' column")]
    MissingPriceField { field: String, origin: String },

    #[error("invalid price history at {date}: {reason}")]
    InvalidHistory { date: NaiveDate, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantbackError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        QuantbackError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantbackError> for std::process::ExitCode {
    fn from(err: &QuantbackError) -> Self {
        let code: u8 = match err {
            QuantbackError::Io(_) => 1,
            QuantbackError::ConfigParse { .. }
            | QuantbackError::ConfigMissing { .. }
            | QuantbackError::ConfigInvalid { .. } => 2,
            QuantbackError::UnknownStrategy { .. } | QuantbackError::InvalidParameter { .. } => 4,
            QuantbackError::MissingPriceField { .. }
            | QuantbackError::InvalidHistory { .. }
            | QuantbackError::Data { .. }
            | QuantbackError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
