//! Boost service implementation
//!
//! Boosts are bought with points and pin a product to the top of the listing
//! until the boost window ends.

use chrono::Utc;
use tracing::info;
use crate::config::Settings;
use crate::database::BoostRepository;
use crate::models::{BoostPlan, BoostPurchase, BoostReceipt, User};
use crate::services::auth::AuthContext;
use crate::services::product::ProductService;
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::pagination;
use crate::utils::logging::log_boost_purchase;

#[derive(Clone, Debug)]
pub struct BoostService {
    boosts: BoostRepository,
    products: ProductService,
    settings: Settings,
}

impl BoostService {
    pub fn new(boosts: BoostRepository, products: ProductService, settings: Settings) -> Self {
        Self { boosts, products, settings }
    }

    /// Configured plan catalogue
    pub fn plans(&self) -> &[BoostPlan] {
        &self.settings.boost.plans
    }

    /// Buy a boost for a product the buyer owns (admins may boost anything)
    pub async fn purchase(&self, ctx: &AuthContext, product_id: i64, plan_id: &str) -> Result<BoostReceipt> {
        let plan = self
            .settings
            .boost_plan(plan_id)
            .ok_or_else(|| LaunchpadError::UnknownBoostPlan(plan_id.to_string()))?;

        let product = self.products.find_approved(product_id).await?;
        ctx.require_manage(product.owner_id)?;

        let receipt = self.boosts.purchase(ctx.user_id(), product.id, plan, Utc::now()).await?;

        info!(
            purchase_id = receipt.purchase.id,
            product_id = product.id,
            plan = %plan.id,
            ends_at = %receipt.purchase.ends_at,
            "Boost purchased"
        );
        log_boost_purchase(ctx.user_id(), product.id, &plan.id, plan.cost_points, receipt.balance);
        Ok(receipt)
    }

    /// The user's purchases, newest first
    pub async fn history(&self, user: &User, page: Option<i64>, per_page: Option<i64>) -> Result<Vec<BoostPurchase>> {
        let (limit, offset) = pagination(page, per_page);
        self.boosts.list_for_user(user.id, limit, offset).await
    }
}
