//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{NestMateError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_dashboard_config(&settings.dashboard)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseSettings) -> Result<()> {
    if config.url.is_empty() {
        return Err(NestMateError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(NestMateError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(NestMateError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate dashboard windows and caps
fn validate_dashboard_config(config: &super::DashboardConfig) -> Result<()> {
    if config.upcoming_window_days <= 0 {
        return Err(NestMateError::Config(
            "Upcoming window must cover at least one day".to_string(),
        ));
    }

    if config.document_expiry_window_days <= 0 {
        return Err(NestMateError::Config(
            "Document expiry window must cover at least one day".to_string(),
        ));
    }

    if config.upcoming_events_limit == 0
        || config.urgent_lists_limit == 0
        || config.expiring_documents_limit == 0
    {
        return Err(NestMateError::Config(
            "Dashboard item limits must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(NestMateError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(NestMateError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
