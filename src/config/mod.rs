//! Configuration management module
//!
//! Layered configuration loading from files and environment variables,
//! plus validation of the resulting settings.

pub mod settings;
pub mod validation;

pub use settings::{DashboardConfig, DatabaseSettings, LoggingConfig, Settings};
