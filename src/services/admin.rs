//! Admin service implementation
//!
//! Moderation queues, user management and boost sales analytics. Every
//! operation requires the admin role.

use chrono::Utc;
use tracing::info;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::{
    BoostSalesMonth, Comment, CommentStatus, CommentView, PlatformStats, Product, ProductStatus, ProductView,
    Role, SalesReport, SalesTotals, User, UserPage,
};
use crate::services::auth::AuthContext;
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::{
    month_key, month_start, optional_text, pagination, recent_month_keys, require_text, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
use crate::utils::logging::{log_admin_action, log_moderation};

pub const DEFAULT_REPORT_MONTHS: u32 = 12;
pub const MAX_REPORT_MONTHS: u32 = 36;
const TOP_PRODUCTS_LIMIT: i64 = 10;
const MAX_REJECTION_REASON_LENGTH: usize = 500;
const MAX_ADJUSTMENT_REASON_LENGTH: usize = 200;

#[derive(Clone, Debug)]
pub struct AdminService {
    db: DatabaseService,
    settings: Settings,
}

impl AdminService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    /// Platform counters
    pub async fn stats(&self, ctx: &AuthContext) -> Result<PlatformStats> {
        ctx.require_admin()?;
        self.db.get_system_stats(Utc::now()).await
    }

    /// Products waiting in a moderation status, `pending` by default
    pub async fn list_products(
        &self,
        ctx: &AuthContext,
        status: Option<&str>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<Vec<ProductView>> {
        ctx.require_admin()?;
        let status = parse_status(status, ProductStatus::Pending)?;
        let (limit, offset) = pagination(page, per_page);
        self.db.products.list_by_status(status, limit, offset).await
    }

    /// Approve a pending or rejected product
    pub async fn approve_product(&self, ctx: &AuthContext, product_id: i64) -> Result<Product> {
        ctx.require_admin()?;

        let (product, from) = self
            .db
            .products
            .approve(product_id, self.settings.points.product_approved)
            .await?;

        log_moderation(ctx.user_id(), "product", product_id, from.as_str(), ProductStatus::Approved.as_str());
        Ok(product)
    }

    /// Reject a pending or approved product with a reason shown to the owner
    pub async fn reject_product(&self, ctx: &AuthContext, product_id: i64, reason: &str) -> Result<Product> {
        ctx.require_admin()?;
        let reason = require_text("reason", reason, 1, MAX_REJECTION_REASON_LENGTH)?;

        let (product, from) = self.db.products.reject(product_id, &reason).await?;

        log_moderation(ctx.user_id(), "product", product_id, from.as_str(), ProductStatus::Rejected.as_str());
        Ok(product)
    }

    /// Comments in a moderation status, `flagged` by default
    pub async fn list_comments(
        &self,
        ctx: &AuthContext,
        status: Option<&str>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<Vec<CommentView>> {
        ctx.require_admin()?;
        let status = parse_status(status, CommentStatus::Flagged)?;
        let (limit, offset) = pagination(page, per_page);
        self.db.comments.list_by_status(status, limit, offset).await
    }

    pub async fn hide_comment(&self, ctx: &AuthContext, comment_id: i64) -> Result<Comment> {
        self.moderate_comment(ctx, comment_id, CommentStatus::Hidden).await
    }

    /// Make a comment visible again and clear its reports
    pub async fn restore_comment(&self, ctx: &AuthContext, comment_id: i64) -> Result<Comment> {
        self.moderate_comment(ctx, comment_id, CommentStatus::Visible).await
    }

    async fn moderate_comment(&self, ctx: &AuthContext, comment_id: i64, to: CommentStatus) -> Result<Comment> {
        ctx.require_admin()?;

        let (comment, from) = self.db.comments.moderate(comment_id, to).await?;

        log_moderation(ctx.user_id(), "comment", comment_id, from.as_str(), to.as_str());
        Ok(comment)
    }

    /// Users, newest first, with optional search on username, email and display name
    pub async fn list_users(
        &self,
        ctx: &AuthContext,
        search: Option<&str>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<UserPage> {
        ctx.require_admin()?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let (limit, offset) = pagination(page, per_page);

        let items = self.db.users.list(search, limit, offset).await?;
        let total = self.db.users.count_matching(search).await?;

        Ok(UserPage {
            items,
            total,
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Ban or unban a user; admins cannot ban themselves
    pub async fn set_ban(&self, ctx: &AuthContext, user_id: i64, banned: bool) -> Result<User> {
        ctx.require_admin()?;
        if banned && user_id == ctx.user_id() {
            return Err(LaunchpadError::InvalidInput("you cannot ban yourself".to_string()));
        }

        let user = self.db.users.set_ban_status(user_id, banned).await?;

        let action = if banned { "ban_user" } else { "unban_user" };
        log_admin_action(ctx.user_id(), action, Some(&user.username), None);
        Ok(user)
    }

    /// Change a user's role; admins cannot demote themselves
    pub async fn set_role(&self, ctx: &AuthContext, user_id: i64, role: Role) -> Result<User> {
        ctx.require_admin()?;
        if user_id == ctx.user_id() && role != Role::Admin {
            return Err(LaunchpadError::InvalidInput("you cannot remove your own admin role".to_string()));
        }

        let user = self.db.users.set_role(user_id, role).await?;

        log_admin_action(ctx.user_id(), "set_role", Some(&user.username), Some(role.as_str()));
        Ok(user)
    }

    /// Credit or debit a user's points; the balance never drops below zero
    pub async fn adjust_points(&self, ctx: &AuthContext, user_id: i64, delta: i64, reason: Option<&str>) -> Result<User> {
        ctx.require_admin()?;
        if delta == 0 {
            return Err(LaunchpadError::InvalidInput("delta must not be zero".to_string()));
        }

        let note = optional_text("reason", reason, MAX_ADJUSTMENT_REASON_LENGTH)?;
        let reason = match &note {
            Some(note) => format!("admin:{}", note),
            None => "admin_adjustment".to_string(),
        };

        let balance = self.db.users.adjust_points(user_id, delta, &reason).await?;
        let user = self
            .db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| LaunchpadError::UserNotFound(user_id.to_string()))?;

        info!(admin_id = ctx.user_id(), user_id = user_id, delta = delta, balance = balance, "Points adjusted");
        log_admin_action(ctx.user_id(), "adjust_points", Some(&user.username), Some(&delta.to_string()));
        Ok(user)
    }

    /// Boost sales for the last `months` months including the current one
    pub async fn sales_report(&self, ctx: &AuthContext, months: Option<u32>) -> Result<SalesReport> {
        ctx.require_admin()?;

        let months = months.unwrap_or(DEFAULT_REPORT_MONTHS);
        if !(1..=MAX_REPORT_MONTHS).contains(&months) {
            return Err(LaunchpadError::InvalidInput(format!(
                "months must be between 1 and {}",
                MAX_REPORT_MONTHS
            )));
        }

        let now = Utc::now();
        self.db.boosts.ensure_month(&month_key(now)).await?;

        let keys = recent_month_keys(now, months);
        let since = keys
            .first()
            .and_then(|key| month_start(key))
            .ok_or_else(|| LaunchpadError::Internal("invalid report window".to_string()))?;

        let rows = self.db.boosts.sales_for_months(&keys).await?;
        let months = fill_months(&keys, rows);
        let totals = SalesTotals {
            purchases: months.iter().map(|m| m.purchases).sum(),
            points_total: months.iter().map(|m| m.points_total).sum(),
        };

        Ok(SalesReport {
            months,
            totals,
            by_plan: self.db.boosts.sales_by_plan(since).await?,
            active_boosts: self.db.boosts.count_active(now).await?,
            top_products: self.db.boosts.top_products(since, TOP_PRODUCTS_LIMIT).await?,
        })
    }
}

fn parse_status<S>(value: Option<&str>, default: S) -> Result<S>
where
    S: std::str::FromStr<Err = String>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v.to_lowercase().parse().map_err(LaunchpadError::InvalidInput),
    }
}

/// One entry per key in order, zero-filled where no counter row exists
pub fn fill_months(keys: &[String], rows: Vec<BoostSalesMonth>) -> Vec<BoostSalesMonth> {
    keys.iter()
        .map(|key| {
            rows.iter()
                .find(|row| &row.month == key)
                .cloned()
                .unwrap_or_else(|| BoostSalesMonth {
                    month: key.clone(),
                    purchases: 0,
                    points_total: 0,
                })
        })
        .collect()
}
