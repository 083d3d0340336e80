//! Comment repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::comment::{Comment, CommentStatus, CommentView};
use crate::utils::errors::{LaunchpadError, Result};

const COMMENT_COLUMNS: &str =
    "c.id, c.product_id, c.user_id, c.parent_id, c.body, c.status, c.report_count, c.created_at, c.updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub async fn create(&self, product_id: i64, user_id: i64, parent_id: Option<i64>, body: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments AS c (product_id, user_id, parent_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(parent_id)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Find comment by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!("SELECT {} FROM comments c WHERE c.id = $1", COMMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// Comments on a product that are not hidden, oldest first
    pub async fn list_for_product(&self, product_id: i64) -> Result<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(&format!(
            r#"
            SELECT {}, u.username AS author_username
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.product_id = $1 AND c.status <> 'hidden'
            ORDER BY c.created_at ASC, c.id ASC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Comments in a moderation status; flagged ones with the most reports come first
    pub async fn list_by_status(&self, status: CommentStatus, limit: i64, offset: i64) -> Result<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(&format!(
            r#"
            SELECT {}, u.username AS author_username
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.status = $1
            ORDER BY c.report_count DESC, c.created_at ASC
            LIMIT $2 OFFSET $3
            "#,
            COMMENT_COLUMNS
        ))
        .bind(status.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Record a report; the status change is checked under the row lock
    pub async fn report(&self, id: i64) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> = sqlx::query_as("SELECT status FROM comments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let (status,) = current.ok_or(LaunchpadError::CommentNotFound { comment_id: id })?;
        let status: CommentStatus = status.parse().map_err(LaunchpadError::Internal)?;
        let next = status.after_report()?;

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments AS c
            SET status = $2, report_count = report_count + 1, updated_at = $3
            WHERE c.id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(next.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Apply a moderation decision; restoring a comment clears its reports
    pub async fn moderate(&self, id: i64, to: CommentStatus) -> Result<(Comment, CommentStatus)> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> = sqlx::query_as("SELECT status FROM comments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let (status,) = current.ok_or(LaunchpadError::CommentNotFound { comment_id: id })?;
        let from: CommentStatus = status.parse().map_err(LaunchpadError::Internal)?;
        from.check_transition(to)?;

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments AS c
            SET status = $2,
                report_count = CASE WHEN $2 = 'visible' THEN 0 ELSE report_count END,
                updated_at = $3
            WHERE c.id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(to.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((comment, from))
    }

    /// Delete a comment and its replies
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of comments per moderation status
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT status, COUNT(*) FROM comments GROUP BY status ORDER BY status")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
