//! Configuration access port trait.
//!
//! Implementors only provide raw string lookup; typed accessors parse on top
//! of it and report unparseable values instead of falling back to a default.

use crate::domain::error::QuantbackError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `Ok(None)` when the key is absent or blank.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, QuantbackError> {
        parse_value(self.get_string(section, key), section, key, "a number")
    }

    /// `Ok(None)` when the key is absent or blank.
    fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>, QuantbackError> {
        parse_value(self.get_string(section, key), section, key, "a non-negative integer")
    }

    /// Comma-separated values, trimmed, blanks dropped.
    fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_string(section, key)
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_value<T: std::str::FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, QuantbackError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| QuantbackError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected {}, got '{}'", expected, s),
            }),
    }
}
