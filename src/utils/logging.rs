//! Logging configuration and setup
//!
//! Tracing initialization plus the structured logging helpers used by the
//! service layer for security-relevant events.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// Returns the worker guard of the file writer (if one is configured); the
/// caller must keep it alive for buffered log lines to be flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let mut guard = None;
    let file_layer = match &config.file_path {
        Some(path) => {
            std::fs::create_dir_all(path)?;
            let appender = tracing_appender::rolling::daily(path, "nestmate.log");
            let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a denied visibility or write-authority decision
pub fn log_access_denied(resource: &str, resource_id: i64, user_id: i64, action: &str) {
    warn!(
        resource = resource,
        resource_id = resource_id,
        user_id = user_id,
        action = action,
        "Access denied"
    );
}

/// Log a family membership mutation
pub fn log_membership_change(family_id: i64, user_id: i64, actor_id: i64, change: &str) {
    info!(
        family_id = family_id,
        user_id = user_id,
        actor_id = actor_id,
        change = change,
        "Family membership changed"
    );
}

/// Log a failed dashboard sub-fetch before the aggregation is abandoned
pub fn log_dashboard_fetch_failure(user_id: i64, category: &str, error: &str) {
    warn!(
        user_id = user_id,
        category = category,
        error = error,
        "Dashboard fetch failed"
    );
}
