//! Product model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::LaunchpadError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub logo_url: Option<String>,
    pub category: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub vote_count: i64,
    pub boosted_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn status(&self) -> ProductStatus {
        self.status.parse().unwrap_or(ProductStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        self.status() == ProductStatus::Approved
    }

    pub fn is_boosted_at(&self, now: DateTime<Utc>) -> bool {
        self.boosted_until.map_or(false, |until| until > now)
    }
}

/// Product joined with the data listings need
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub owner_username: String,
    pub comment_count: i64,
    pub is_boosted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::Rejected => "rejected",
        }
    }

    /// Check a moderation decision against the current status
    pub fn check_transition(self, to: ProductStatus) -> Result<(), LaunchpadError> {
        use ProductStatus::*;

        match (self, to) {
            (Pending, Approved) | (Pending, Rejected) | (Rejected, Approved) | (Approved, Rejected) => Ok(()),
            (from, to) => Err(LaunchpadError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProductStatus::Pending),
            "approved" => Ok(ProductStatus::Approved),
            "rejected" => Ok(ProductStatus::Rejected),
            other => Err(format!("Unknown product status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    pub website_url: String,
    pub logo_url: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub category: Option<String>,
}

/// Validated product fields ready to be written
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub owner_id: i64,
    pub name: String,
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub logo_url: Option<String>,
    pub category: String,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    #[default]
    Trending,
    Newest,
    Top,
}

impl ProductSort {
    /// ORDER BY fragment applied after boosted products
    pub fn order_clause(&self) -> &'static str {
        match self {
            ProductSort::Trending => "p.vote_count DESC, p.created_at DESC",
            ProductSort::Newest => "p.created_at DESC",
            ProductSort::Top => "p.vote_count DESC, p.id ASC",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
