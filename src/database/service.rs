//! Database service layer
//!
//! This module provides a high-level interface to database operations

use chrono::{DateTime, Utc};
use crate::database::{DatabasePool, UserRepository, ProductRepository, VoteRepository, CommentRepository, BoostRepository};
use crate::models::PlatformStats;
use crate::utils::errors::LaunchpadError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub products: ProductRepository,
    pub votes: VoteRepository,
    pub comments: CommentRepository,
    pub boosts: BoostRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            votes: VoteRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            boosts: BoostRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> Result<(), LaunchpadError> {
        crate::database::health_check(&self.pool).await
    }

    /// Get system statistics
    pub async fn get_system_stats(&self, now: DateTime<Utc>) -> Result<PlatformStats, LaunchpadError> {
        let users = self.users.count().await?;
        let banned: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_banned")
            .fetch_one(&self.pool)
            .await?;

        let products = PlatformStats::status_map(
            &["pending", "approved", "rejected"],
            self.products.count_by_status().await?,
        );
        let comments = PlatformStats::status_map(
            &["visible", "flagged", "hidden"],
            self.comments.count_by_status().await?,
        );

        Ok(PlatformStats {
            users,
            banned_users: banned.0,
            products,
            comments,
            votes: self.votes.count().await?,
            active_boosts: self.boosts.count_active(now).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::database::create_lazy_pool;

    #[tokio::test]
    async fn test_database_service_creation() {
        let mut config = Settings::default().database;
        config.url = "postgresql://nobody@127.0.0.1:1/none".to_string();
        config.min_connections = 0;

        let pool = create_lazy_pool(&config).unwrap();
        let service = DatabaseService::new(pool);
        assert_eq!(service.pool().size(), 0);
    }
}
