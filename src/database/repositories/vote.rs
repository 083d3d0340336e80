//! Vote repository implementation

use sqlx::PgPool;
use crate::database::repositories::user::apply_points;
use crate::models::vote::VoteOutcome;
use crate::utils::errors::{LaunchpadError, Result};

#[derive(Clone)]
#[derive(Debug)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a vote. Repeated votes change nothing.
    ///
    /// A new vote bumps the product's counter and credits the owner `reward`
    /// points unless the voter is the owner.
    pub async fn add(&self, product_id: i64, user_id: i64, reward: i64) -> Result<VoteOutcome> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO votes (product_id, user_id) VALUES ($1, $2) ON CONFLICT (product_id, user_id) DO NOTHING"
        )
        .bind(product_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let (owner_id, vote_count): (i64, i64) = if inserted {
            sqlx::query_as::<_, (i64, i64)>(
                "UPDATE products SET vote_count = vote_count + 1 WHERE id = $1 RETURNING owner_id, vote_count"
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_as::<_, (i64, i64)>("SELECT owner_id, vote_count FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        .ok_or_else(|| LaunchpadError::ProductNotFound(product_id.to_string()))?;

        if inserted && owner_id != user_id && reward > 0 {
            apply_points(&mut *tx, owner_id, reward, "vote_received").await?;
        }

        tx.commit().await?;

        Ok(VoteOutcome { product_id, voted: true, vote_count })
    }

    /// Remove a vote. Removing a missing vote changes nothing.
    ///
    /// The owner gives back the `reward` the vote earned them.
    pub async fn remove(&self, product_id: i64, user_id: i64, reward: i64) -> Result<VoteOutcome> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM votes WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        let (owner_id, vote_count): (i64, i64) = if deleted {
            sqlx::query_as::<_, (i64, i64)>(
                "UPDATE products SET vote_count = GREATEST(vote_count - 1, 0) WHERE id = $1 RETURNING owner_id, vote_count"
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_as::<_, (i64, i64)>("SELECT owner_id, vote_count FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        .ok_or_else(|| LaunchpadError::ProductNotFound(product_id.to_string()))?;

        if deleted && owner_id != user_id && reward > 0 {
            apply_points(&mut *tx, owner_id, -reward, "vote_removed").await?;
        }

        tx.commit().await?;

        Ok(VoteOutcome { product_id, voted: false, vote_count })
    }

    /// Count total votes
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM votes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
