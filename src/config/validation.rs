//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use std::collections::HashSet;
use crate::utils::errors::{LaunchpadError, Result};
use super::{Settings, SessionBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_session_config(&settings.session)?;
    if settings.session.backend == SessionBackend::Redis {
        validate_redis_config(&settings.redis)?;
    }
    validate_auth_config(&settings.auth)?;
    validate_points_config(&settings.points)?;
    validate_boost_config(&settings.boost)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LaunchpadError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(LaunchpadError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(LaunchpadError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LaunchpadError::Config(
            "Redis URL is required when sessions are stored in Redis".to_string()
        ));
    }

    Ok(())
}

/// Validate session configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.cookie_name.trim().is_empty() {
        return Err(LaunchpadError::Config(
            "Session cookie name is required".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(LaunchpadError::Config(
            "Session TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate account configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.min_password_length < 6 {
        return Err(LaunchpadError::Config(
            "Minimum password length must be at least 6".to_string()
        ));
    }

    Ok(())
}

/// Validate point rewards
fn validate_points_config(config: &super::PointsConfig) -> Result<()> {
    if config.signup_bonus < 0 || config.product_approved < 0 || config.vote_received < 0 {
        return Err(LaunchpadError::Config(
            "Point rewards cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate the boost catalogue
fn validate_boost_config(config: &super::BoostConfig) -> Result<()> {
    if config.plans.is_empty() {
        return Err(LaunchpadError::Config(
            "At least one boost plan must be configured".to_string()
        ));
    }

    let mut seen = HashSet::new();
    for plan in &config.plans {
        if plan.id.trim().is_empty() {
            return Err(LaunchpadError::Config("Boost plan id is required".to_string()));
        }

        if !seen.insert(plan.id.as_str()) {
            return Err(LaunchpadError::Config(
                format!("Duplicate boost plan id: {}", plan.id)
            ));
        }

        if plan.duration_days <= 0 || plan.cost_points <= 0 {
            return Err(LaunchpadError::Config(
                format!("Boost plan {} must have a positive duration and cost", plan.id)
            ));
        }
    }

    Ok(())
}

/// Validate rate limiting configuration
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(LaunchpadError::Config(
            "Requests per minute must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LaunchpadError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(LaunchpadError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::boost::BoostPlan;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_bad_connection_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(LaunchpadError::Config(_)));
    }

    #[test]
    fn test_memory_sessions_do_not_need_redis() {
        let mut settings = Settings::default();
        settings.redis.url = String::new();
        assert!(validate_settings(&settings).is_err());

        settings.session.backend = SessionBackend::Memory;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_boost_plans() {
        let mut settings = Settings::default();
        settings.boost.plans.push(BoostPlan {
            id: "day".to_string(),
            name: "Another day".to_string(),
            duration_days: 1,
            cost_points: 10,
        });
        assert_matches!(validate_settings(&settings), Err(LaunchpadError::Config(msg)) if msg.contains("Duplicate"));
    }

    #[test]
    fn test_rejects_free_boost_plans() {
        let mut settings = Settings::default();
        settings.boost.plans[0].cost_points = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
