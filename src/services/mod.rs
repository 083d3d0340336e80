//! Services module
//!
//! This module contains business logic services

pub mod admin;
pub mod auth;
pub mod boost;
pub mod comment;
pub mod product;
pub mod redis;
pub mod session;
pub mod user;
pub mod vote;

// Re-export commonly used services
pub use admin::AdminService;
pub use auth::{AuthService, AuthContext, Permission};
pub use boost::BoostService;
pub use comment::CommentService;
pub use product::ProductService;
pub use redis::RedisService;
pub use session::{SessionService, SessionStore, RedisSessionStore, MemorySessionStore, Session};
pub use user::UserService;
pub use vote::VoteService;

use serde::Serialize;
use crate::config::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub sessions: SessionService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub product_service: ProductService,
    pub vote_service: VoteService,
    pub comment_service: CommentService,
    pub boost_service: BoostService,
    pub admin_service: AdminService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, sessions: SessionService, settings: Settings) -> Self {
        let product_service = ProductService::new(db.products.clone(), settings.clone());

        Self {
            auth_service: AuthService::new(db.users.clone(), sessions.clone(), settings.clone()),
            user_service: UserService::new(db.users.clone(), db.products.clone()),
            vote_service: VoteService::new(db.votes.clone(), product_service.clone(), settings.clone()),
            comment_service: CommentService::new(db.comments.clone(), product_service.clone(), settings.clone()),
            boost_service: BoostService::new(db.boosts.clone(), product_service.clone(), settings.clone()),
            admin_service: AdminService::new(db.clone(), settings),
            product_service,
            sessions,
            db,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = match self.db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        };

        ServiceHealthStatus {
            database_healthy,
            session_store_healthy: self.sessions.health_check().await,
            session_backend: self.sessions.backend_name(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub session_store_healthy: bool,
    pub session_backend: &'static str,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.session_store_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.session_store_healthy {
            issues.push(format!("Session store ({}) unavailable", self.session_backend));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_issues() {
        let status = ServiceHealthStatus {
            database_healthy: false,
            session_store_healthy: true,
            session_backend: "memory",
        };

        assert!(!status.is_healthy());
        assert_eq!(status.get_issues(), vec!["Database connection failed".to_string()]);
    }
}
