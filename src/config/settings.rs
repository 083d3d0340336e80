//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};
use crate::models::boost::BoostPlan;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
    pub points: PointsConfig,
    pub boost: BoostConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built frontend, served for unknown paths
    pub static_dir: Option<String>,
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Where sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Redis,
    Memory,
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub secure_cookie: bool,
}

/// Account configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Emails that receive the admin role when they register
    pub admin_emails: Vec<String>,
    pub min_password_length: usize,
}

/// Point rewards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointsConfig {
    pub signup_bonus: i64,
    pub product_approved: i64,
    pub vote_received: i64,
}

/// Boost catalogue
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoostConfig {
    pub plans: Vec<BoostPlan>,
}

/// Per-client request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
    /// Key clients by `x-forwarded-for`. Only safe behind a proxy that sets it.
    pub trust_forwarded_for: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_dir: Option<String>,
    pub file_prefix: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub auto_approve_products: bool,
    pub comment_reports: bool,
    pub allow_self_votes: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load settings layering defaults, the named config file (if present) and
    /// `LAUNCHPAD__`-prefixed environment variables
    pub fn load_from(config_file: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(
                config::Environment::with_prefix("LAUNCHPAD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LaunchpadError> {
        super::validation::validate_settings(self)
    }

    /// Look up a boost plan by id
    pub fn boost_plan(&self, plan_id: &str) -> Option<&BoostPlan> {
        self.boost.plans.iter().find(|plan| plan.id == plan_id)
    }

    /// Whether the email should be granted the admin role on registration
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.auth
            .admin_emails
            .iter()
            .any(|admin| admin.trim().eq_ignore_ascii_case(email))
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                static_dir: None,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/launchpad".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "launchpad:".to_string(),
                ttl_seconds: 3600,
            },
            session: SessionConfig {
                backend: SessionBackend::Redis,
                cookie_name: "launchpad_session".to_string(),
                ttl_seconds: 60 * 60 * 24 * 30,
                secure_cookie: false,
            },
            auth: AuthConfig {
                admin_emails: vec![],
                min_password_length: 8,
            },
            points: PointsConfig {
                signup_bonus: 100,
                product_approved: 50,
                vote_received: 1,
            },
            boost: BoostConfig {
                plans: vec![
                    BoostPlan {
                        id: "day".to_string(),
                        name: "24-hour boost".to_string(),
                        duration_days: 1,
                        cost_points: 100,
                    },
                    BoostPlan {
                        id: "week".to_string(),
                        name: "7-day boost".to_string(),
                        duration_days: 7,
                        cost_points: 500,
                    },
                    BoostPlan {
                        id: "month".to_string(),
                        name: "30-day boost".to_string(),
                        duration_days: 30,
                        cost_points: 1500,
                    },
                ],
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: 120,
                burst: 30,
                trust_forwarded_for: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_dir: None,
                file_prefix: "launchpad.log".to_string(),
            },
            features: FeaturesConfig {
                auto_approve_products: false,
                comment_reports: true,
                allow_self_votes: false,
            },
        }
    }
}
