//! Boost repository implementation
//!
//! Purchases and the monthly sales counters. A purchase is one transaction:
//! the product and buyer rows are locked (in that order), points are debited,
//! the product's boost window is extended and the month's counter row is
//! upserted.

use std::time::Instant;
use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::database::repositories::user::apply_points;
use crate::models::boost::{BoostPlan, BoostPurchase, BoostReceipt, BoostSalesMonth, PlanSales, TopBoostedProduct};
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::month_key;
use crate::utils::logging::log_database_operation;

const PURCHASE_COLUMNS: &str = "id, product_id, user_id, plan_id, cost_points, starts_at, ends_at, created_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct BoostRepository {
    pool: PgPool,
}

impl BoostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Buy `plan` for a product, paying with `user_id`'s points
    pub async fn purchase(&self, user_id: i64, product_id: i64, plan: &BoostPlan, now: DateTime<Utc>) -> Result<BoostReceipt> {
        let started = Instant::now();
        let result = self.purchase_in_transaction(user_id, product_id, plan, now).await;
        log_database_operation("boost_purchase", "boost_purchases", started.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    async fn purchase_in_transaction(&self, user_id: i64, product_id: i64, plan: &BoostPlan, now: DateTime<Utc>) -> Result<BoostReceipt> {
        let mut tx = self.pool.begin().await?;

        // Product before buyer, the same order votes and approvals take
        let product: Option<(Option<DateTime<Utc>>,)> =
            sqlx::query_as("SELECT boosted_until FROM products WHERE id = $1 FOR NO KEY UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (boosted_until,) = product.ok_or_else(|| LaunchpadError::ProductNotFound(product_id.to_string()))?;

        let balance: Option<(i64,)> = sqlx::query_as("SELECT points FROM users WHERE id = $1 FOR NO KEY UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let (available,) = balance.ok_or_else(|| LaunchpadError::UserNotFound(user_id.to_string()))?;

        if available < plan.cost_points {
            return Err(LaunchpadError::InsufficientPoints {
                required: plan.cost_points,
                available,
            });
        }

        let balance = apply_points(&mut *tx, user_id, -plan.cost_points, &format!("boost:{}", plan.id)).await?;

        let (starts_at, ends_at) = plan.window(now, boosted_until);

        sqlx::query("UPDATE products SET boosted_until = $2, updated_at = $3 WHERE id = $1")
            .bind(product_id)
            .bind(ends_at)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let purchase = sqlx::query_as::<_, BoostPurchase>(&format!(
            r#"
            INSERT INTO boost_purchases (product_id, user_id, plan_id, cost_points, starts_at, ends_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(&plan.id)
        .bind(plan.cost_points)
        .bind(starts_at)
        .bind(ends_at)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO boost_sales (month, purchases, points_total, updated_at)
            VALUES ($1, 1, $2, $3)
            ON CONFLICT (month)
            DO UPDATE SET
                purchases = boost_sales.purchases + 1,
                points_total = boost_sales.points_total + EXCLUDED.points_total,
                updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(month_key(now))
        .bind(plan.cost_points)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BoostReceipt { purchase, balance })
    }

    /// Purchases made by a user, newest first
    pub async fn list_for_user(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<BoostPurchase>> {
        let purchases = sqlx::query_as::<_, BoostPurchase>(&format!(
            "SELECT {} FROM boost_purchases WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            PURCHASE_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Make sure the counter row for a month exists
    pub async fn ensure_month(&self, month: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO boost_sales (month, purchases, points_total) VALUES ($1, 0, 0) ON CONFLICT (month) DO NOTHING"
        )
        .bind(month)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counter rows for the given months
    pub async fn sales_for_months(&self, months: &[String]) -> Result<Vec<BoostSalesMonth>> {
        let rows = sqlx::query_as::<_, BoostSalesMonth>(
            "SELECT month, purchases, points_total FROM boost_sales WHERE month = ANY($1) ORDER BY month ASC"
        )
        .bind(months)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Purchases and points per plan since `since`
    pub async fn sales_by_plan(&self, since: DateTime<Utc>) -> Result<Vec<PlanSales>> {
        let rows = sqlx::query_as::<_, PlanSales>(
            r#"
            SELECT plan_id, COUNT(*) AS purchases, COALESCE(SUM(cost_points), 0)::BIGINT AS points_total
            FROM boost_purchases
            WHERE created_at >= $1
            GROUP BY plan_id
            ORDER BY points_total DESC, plan_id ASC
            "#
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Products with the most boost spending since `since`
    pub async fn top_products(&self, since: DateTime<Utc>, limit: i64) -> Result<Vec<TopBoostedProduct>> {
        let rows = sqlx::query_as::<_, TopBoostedProduct>(
            r#"
            SELECT p.id AS product_id, p.name, p.slug,
                   COUNT(b.id) AS purchases,
                   COALESCE(SUM(b.cost_points), 0)::BIGINT AS points_total
            FROM boost_purchases b
            JOIN products p ON p.id = b.product_id
            WHERE b.created_at >= $1
            GROUP BY p.id, p.name, p.slug
            ORDER BY points_total DESC, purchases DESC, p.id ASC
            LIMIT $2
            "#
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of products whose boost window is open
    pub async fn count_active(&self, now: DateTime<Utc>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE boosted_until > $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
