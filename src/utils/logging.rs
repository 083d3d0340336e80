//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Launchpad application.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{LaunchpadError, Result};

/// Initialize logging based on configuration.
///
/// Logs always go to stdout. When `file_dir` is configured a daily rolling file is
/// written as well; the returned guard must be kept alive for the lifetime of the
/// process or buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match config.file_dir.as_deref() {
        Some(dir) if !dir.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| LaunchpadError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a completed boost purchase
pub fn log_boost_purchase(user_id: i64, product_id: i64, plan_id: &str, cost_points: i64, balance_after: i64) {
    info!(
        user_id = user_id,
        product_id = product_id,
        plan_id = plan_id,
        cost_points = cost_points,
        balance_after = balance_after,
        "Boost purchased"
    );
}

/// Log moderation status changes
pub fn log_moderation(admin_id: i64, entity: &str, entity_id: i64, from: &str, to: &str) {
    warn!(
        admin_id = admin_id,
        entity = entity,
        entity_id = entity_id,
        from = from,
        to = to,
        "Moderation status changed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        warn!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
