//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest, UpdateUserRequest, PointTransaction, Role};
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::contains_pattern;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, display_name, bio, website_url, role, points, is_banned, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user and credit the signup bonus in one transaction
    pub async fn create(&self, request: CreateUserRequest, signup_bonus: i64) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, display_name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&request.email)
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(&request.display_name)
        .bind(request.role.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let user = if signup_bonus > 0 {
            let points = apply_points(&mut *tx, user.id, signup_bonus, "signup_bonus").await?;
            User { points, ..user }
        } else {
            user
        };

        tx.commit().await?;
        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .bind(username.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by email or username
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1 OR username = $1",
            USER_COLUMNS
        ))
        .bind(login.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Whether an email or username is already registered
    pub async fn exists(&self, email: &str, username: &str) -> Result<(bool, bool)> {
        let row: (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE email = $1),
                EXISTS (SELECT 1 FROM users WHERE username = $2)
            "#
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Update profile fields; `None` leaves a field untouched, `Some("")` clears it
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET display_name = CASE WHEN $2::TEXT IS NULL THEN display_name ELSE NULLIF($2, '') END,
                bio = CASE WHEN $3::TEXT IS NULL THEN bio ELSE NULLIF($3, '') END,
                website_url = CASE WHEN $4::TEXT IS NULL THEN website_url ELSE NULLIF($4, '') END,
                updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(request.display_name)
        .bind(request.bio)
        .bind(request.website_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| LaunchpadError::UserNotFound(id.to_string()))
    }

    /// List users with optional search and pagination
    pub async fn list(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<User>> {
        let pattern = search.map(|s| contains_pattern(s.trim()));
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {} FROM users
            WHERE $1::TEXT IS NULL OR username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\' OR display_name ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        ))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count users matching the same search as `list`
    pub async fn count_matching(&self, search: Option<&str>) -> Result<i64> {
        let pattern = search.map(|s| contains_pattern(s.trim()));
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE $1::TEXT IS NULL OR username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\' OR display_name ILIKE $1 ESCAPE '\'
            "#
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Ban/unban user
    pub async fn set_ban_status(&self, id: i64, is_banned: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_banned = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(is_banned)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| LaunchpadError::UserNotFound(id.to_string()))
    }

    /// Change a user's role
    pub async fn set_role(&self, id: i64, role: Role) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| LaunchpadError::UserNotFound(id.to_string()))
    }

    /// Apply a point adjustment outside of any other operation; returns the new balance
    pub async fn adjust_points(&self, id: i64, delta: i64, reason: &str) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let balance = apply_points(&mut *tx, id, delta, reason).await?;
        tx.commit().await?;

        Ok(balance)
    }

    /// Ledger entries for a user, newest first
    pub async fn point_transactions(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<PointTransaction>> {
        let rows = sqlx::query_as::<_, PointTransaction>(
            r#"
            SELECT id, user_id, delta, balance_after, reason, created_at
            FROM point_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Change a user's balance and record it in the ledger on the given connection.
///
/// The balance never drops below zero; the ledger records the delta that was
/// actually applied. Returns the new balance.
pub(crate) async fn apply_points(conn: &mut PgConnection, user_id: i64, delta: i64, reason: &str) -> Result<i64> {
    let current: Option<(i64,)> = sqlx::query_as("SELECT points FROM users WHERE id = $1 FOR NO KEY UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    let (current,) = current.ok_or_else(|| LaunchpadError::UserNotFound(user_id.to_string()))?;
    let balance = (current + delta).max(0);
    let applied = balance - current;

    if applied == 0 {
        return Ok(current);
    }

    sqlx::query("UPDATE users SET points = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(balance)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO point_transactions (user_id, delta, balance_after, reason) VALUES ($1, $2, $3, $4)"
    )
    .bind(user_id)
    .bind(applied)
    .bind(balance)
    .bind(reason)
    .execute(&mut *conn)
    .await?;

    Ok(balance)
}
