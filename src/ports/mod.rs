//! Port traits for the data, configuration and presentation collaborators.

pub mod config_port;
pub mod data_port;
pub mod report_port;
