//! Product repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::database::repositories::user::apply_points;
use crate::models::product::{NewProduct, Product, ProductSort, ProductStatus, ProductView};
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::contains_pattern;

const PRODUCT_COLUMNS: &str = "p.id, p.owner_id, p.name, p.slug, p.tagline, p.description, p.website_url, \
    p.logo_url, p.category, p.status, p.rejection_reason, p.vote_count, p.boosted_until, p.created_at, \
    p.updated_at, p.approved_at";

/// Columns of `ProductView`, selected from `products p JOIN users u`
fn view_select() -> String {
    format!(
        r#"
        SELECT {},
            u.username AS owner_username,
            (SELECT COUNT(*) FROM comments c WHERE c.product_id = p.id AND c.status <> 'hidden') AS comment_count,
            (p.boosted_until IS NOT NULL AND p.boosted_until > NOW()) AS is_boosted
        FROM products p
        JOIN users u ON u.id = p.owner_id
        "#,
        PRODUCT_COLUMNS
    )
}

/// Filters for the public listing
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: ProductSort,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new product
    pub async fn create(&self, product: NewProduct) -> Result<Product> {
        let now = Utc::now();
        let approved_at = (product.status == ProductStatus::Approved).then_some(now);

        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products AS p (owner_id, name, slug, tagline, description, website_url, logo_url, category,
                                       status, created_at, updated_at, approved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.owner_id)
        .bind(product.name)
        .bind(product.slug)
        .bind(product.tagline)
        .bind(product.description)
        .bind(product.website_url)
        .bind(product.logo_url)
        .bind(product.category)
        .bind(product.status.as_str())
        .bind(now)
        .bind(approved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Whether a slug is taken
    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Find product by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products p WHERE p.id = $1", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Find a product with listing data by slug
    pub async fn find_view_by_slug(&self, slug: &str) -> Result<Option<ProductView>> {
        let view = sqlx::query_as::<_, ProductView>(&format!("{} WHERE p.slug = $1", view_select()))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    /// Approved products matching the filter, boosted ones first, with the total count
    pub async fn list_approved(&self, filter: &ProductFilter, limit: i64, offset: i64) -> Result<(Vec<ProductView>, i64)> {
        let pattern = filter.search.as_deref().map(contains_pattern);
        let conditions = r#"
            WHERE p.status = 'approved'
              AND ($1::TEXT IS NULL OR p.category = $1)
              AND ($2::TEXT IS NULL OR p.name ILIKE $2 ESCAPE '\' OR p.tagline ILIKE $2 ESCAPE '\')
        "#;

        let items = sqlx::query_as::<_, ProductView>(&format!(
            "{} {} ORDER BY is_boosted DESC, {} LIMIT $3 OFFSET $4",
            view_select(),
            conditions,
            filter.sort.order_clause()
        ))
        .bind(&filter.category)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products p {}", conditions))
            .bind(&filter.category)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total.0))
    }

    /// Approved products of one owner, newest first
    pub async fn list_approved_by_owner(&self, owner_id: i64) -> Result<Vec<ProductView>> {
        let items = sqlx::query_as::<_, ProductView>(&format!(
            "{} WHERE p.owner_id = $1 AND p.status = 'approved' ORDER BY p.created_at DESC",
            view_select()
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Products in a moderation status, oldest first
    pub async fn list_by_status(&self, status: ProductStatus, limit: i64, offset: i64) -> Result<Vec<ProductView>> {
        let items = sqlx::query_as::<_, ProductView>(&format!(
            "{} WHERE p.status = $1 ORDER BY p.created_at ASC LIMIT $2 OFFSET $3",
            view_select()
        ))
        .bind(status.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Write edited fields back. When `resubmit` is set a rejected product returns to pending.
    pub async fn update(&self, product: &Product, resubmit: bool) -> Result<Product> {
        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products AS p
            SET name = $2,
                tagline = $3,
                description = $4,
                website_url = $5,
                logo_url = $6,
                category = $7,
                status = CASE WHEN $8 AND status = 'rejected' THEN 'pending' ELSE status END,
                rejection_reason = CASE WHEN $8 AND status = 'rejected' THEN NULL ELSE rejection_reason END,
                updated_at = $9
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.tagline)
        .bind(&product.description)
        .bind(&product.website_url)
        .bind(&product.logo_url)
        .bind(&product.category)
        .bind(resubmit)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| LaunchpadError::ProductNotFound(product.id.to_string()))
    }

    /// Move a product to `approved`; the first approval credits the owner `reward` points
    pub async fn approve(&self, id: i64, reward: i64) -> Result<(Product, ProductStatus)> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE p.id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| LaunchpadError::ProductNotFound(id.to_string()))?;

        let from = current.status();
        from.check_transition(ProductStatus::Approved)?;

        let now = Utc::now();
        let approved = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products AS p
            SET status = 'approved', rejection_reason = NULL, approved_at = COALESCE(approved_at, $2), updated_at = $2
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if current.approved_at.is_none() && reward > 0 {
            apply_points(&mut *tx, current.owner_id, reward, "product_approved").await?;
        }

        tx.commit().await?;
        Ok((approved, from))
    }

    /// Move a product to `rejected` with a reason
    pub async fn reject(&self, id: i64, reason: &str) -> Result<(Product, ProductStatus)> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> = sqlx::query_as("SELECT status FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let (status,) = current.ok_or_else(|| LaunchpadError::ProductNotFound(id.to_string()))?;
        let from: ProductStatus = status.parse().map_err(LaunchpadError::Internal)?;
        from.check_transition(ProductStatus::Rejected)?;

        let rejected = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products AS p
            SET status = 'rejected', rejection_reason = $2, updated_at = $3
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(reason)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((rejected, from))
    }

    /// Delete product; votes, comments and purchases cascade
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of products per moderation status
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT status, COUNT(*) FROM products GROUP BY status ORDER BY status")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
