//! Boost models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// A purchasable promotion, configured in `[boost]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostPlan {
    pub id: String,
    pub name: String,
    pub duration_days: i32,
    pub cost_points: i64,
}

impl BoostPlan {
    /// Boost window when bought at `now` on top of an existing `boosted_until`.
    ///
    /// An active boost is extended from its end; an expired or missing one starts now.
    pub fn window(&self, now: DateTime<Utc>, boosted_until: Option<DateTime<Utc>>) -> (DateTime<Utc>, DateTime<Utc>) {
        let starts_at = match boosted_until {
            Some(until) if until > now => until,
            _ => now,
        };
        (starts_at, starts_at + Duration::days(i64::from(self.duration_days)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoostPurchase {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub plan_id: String,
    pub cost_points: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostReceipt {
    pub purchase: BoostPurchase,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseBoostRequest {
    pub plan: String,
}

/// Monthly boost sales counter row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BoostSalesMonth {
    pub month: String,
    pub purchases: i64,
    pub points_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanSales {
    pub plan_id: String,
    pub purchases: i64,
    pub points_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopBoostedProduct {
    pub product_id: i64,
    pub name: String,
    pub slug: String,
    pub purchases: i64,
    pub points_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTotals {
    pub purchases: i64,
    pub points_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub months: Vec<BoostSalesMonth>,
    pub totals: SalesTotals,
    pub by_plan: Vec<PlanSales>,
    pub active_boosts: i64,
    pub top_products: Vec<TopBoostedProduct>,
}
