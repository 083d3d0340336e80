//! Product service implementation
//!
//! Submission, the public listing and owner edits. Moderation lives in the
//! admin service.

use tracing::{debug, info};
use crate::config::Settings;
use crate::database::{ProductFilter, ProductRepository};
use crate::models::{
    CreateProductRequest, NewProduct, Product, ProductPage, ProductQuery, ProductStatus, ProductView,
    UpdateProductRequest, User,
};
use crate::services::auth::AuthContext;
use crate::utils::errors::{is_unique_violation, LaunchpadError, Result};
use crate::utils::helpers::{
    optional_text, pagination, parse_web_url, require_text, slug_candidate, slugify, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
use crate::utils::logging::log_user_action;

const MAX_NAME_LENGTH: usize = 80;
const MAX_TAGLINE_LENGTH: usize = 140;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_CATEGORY_LENGTH: usize = 40;
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Slugs that would shadow `/api/products/id/...` routes
const RESERVED_SLUGS: &[&str] = &["id"];

/// Product fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub logo_url: Option<String>,
    pub category: String,
}

impl ValidatedProduct {
    pub fn from_request(request: &CreateProductRequest) -> Result<Self> {
        Ok(Self {
            name: require_text("name", &request.name, 1, MAX_NAME_LENGTH)?,
            tagline: require_text("tagline", &request.tagline, 1, MAX_TAGLINE_LENGTH)?,
            description: optional_text("description", Some(&request.description), MAX_DESCRIPTION_LENGTH)?
                .unwrap_or_default(),
            website_url: parse_web_url("website_url", &request.website_url)?,
            logo_url: optional_logo(request.logo_url.as_deref())?,
            category: require_text("category", &request.category, 1, MAX_CATEGORY_LENGTH)?.to_lowercase(),
        })
    }

    /// Apply the fields present in an edit on top of an existing product
    pub fn merge(product: &Product, request: &UpdateProductRequest) -> Result<Self> {
        let merged = CreateProductRequest {
            name: request.name.clone().unwrap_or_else(|| product.name.clone()),
            tagline: request.tagline.clone().unwrap_or_else(|| product.tagline.clone()),
            description: request.description.clone().unwrap_or_else(|| product.description.clone()),
            website_url: request.website_url.clone().unwrap_or_else(|| product.website_url.clone()),
            logo_url: match &request.logo_url {
                Some(logo) => Some(logo.clone()),
                None => product.logo_url.clone(),
            },
            category: request.category.clone().unwrap_or_else(|| product.category.clone()),
        };

        Self::from_request(&merged)
    }
}

fn optional_logo(value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) => parse_web_url("logo_url", url).map(Some),
    }
}

/// Product service for submissions and listings
#[derive(Clone, Debug)]
pub struct ProductService {
    products: ProductRepository,
    settings: Settings,
}

impl ProductService {
    pub fn new(products: ProductRepository, settings: Settings) -> Self {
        Self { products, settings }
    }

    /// Submit a new product for review
    pub async fn submit(&self, owner: &User, request: CreateProductRequest) -> Result<Product> {
        let fields = ValidatedProduct::from_request(&request)?;
        let status = if self.settings.features.auto_approve_products {
            ProductStatus::Approved
        } else {
            ProductStatus::Pending
        };

        let base = slugify(&fields.name);
        let first_attempt = if RESERVED_SLUGS.contains(&base.as_str()) { 2 } else { 1 };
        for attempt in first_attempt..=MAX_SLUG_ATTEMPTS {
            let slug = slug_candidate(&base, attempt);
            if self.products.slug_exists(&slug).await? {
                continue;
            }

            let new_product = NewProduct {
                owner_id: owner.id,
                name: fields.name.clone(),
                slug,
                tagline: fields.tagline.clone(),
                description: fields.description.clone(),
                website_url: fields.website_url.clone(),
                logo_url: fields.logo_url.clone(),
                category: fields.category.clone(),
                status,
            };

            match self.products.create(new_product).await {
                Ok(product) => {
                    info!(product_id = product.id, owner_id = owner.id, slug = %product.slug, status = %status, "Product submitted");
                    log_user_action(owner.id, "submit_product", Some(&product.slug));
                    return Ok(product);
                }
                // Lost a race for the slug; try the next candidate
                Err(LaunchpadError::Database(ref e)) if is_unique_violation(e) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(LaunchpadError::Conflict(format!("could not find a free slug for '{}'", base)))
    }

    /// Approved products, boosted ones first
    pub async fn list(&self, query: ProductQuery) -> Result<ProductPage> {
        let (limit, offset) = pagination(query.page, query.per_page);
        let filter = ProductFilter {
            search: query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(str::to_string),
            category: query
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_lowercase),
            sort: query.sort,
        };

        debug!(?filter, limit = limit, offset = offset, "Listing products");
        let (items, total) = self.products.list_approved(&filter, limit, offset).await?;

        Ok(ProductPage {
            items,
            total,
            page: query.page.unwrap_or(1).max(1),
            per_page: query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Product by slug. Unapproved products are only shown to the owner and admins.
    pub async fn get(&self, slug: &str, viewer: Option<&AuthContext>) -> Result<ProductView> {
        let view = self
            .products
            .find_view_by_slug(slug)
            .await?
            .ok_or_else(|| LaunchpadError::ProductNotFound(slug.to_string()))?;

        if view.product.is_approved() || viewer.is_some_and(|v| v.can_manage(view.product.owner_id)) {
            Ok(view)
        } else {
            Err(LaunchpadError::ProductNotFound(slug.to_string()))
        }
    }

    /// Product by id under the same visibility rule as `get`
    pub async fn find_visible(&self, id: i64, viewer: Option<&AuthContext>) -> Result<Product> {
        let product = self.find(id).await?;

        if product.is_approved() || viewer.is_some_and(|v| v.can_manage(product.owner_id)) {
            Ok(product)
        } else {
            Err(LaunchpadError::ProductNotFound(id.to_string()))
        }
    }

    /// Product by id that must be approved
    pub async fn find_approved(&self, id: i64) -> Result<Product> {
        let product = self.find(id).await?;
        if !product.is_approved() {
            return Err(LaunchpadError::InvalidInput("product is not approved".to_string()));
        }
        Ok(product)
    }

    async fn find(&self, id: i64) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| LaunchpadError::ProductNotFound(id.to_string()))
    }

    /// Edit a product. An owner editing a rejected product sends it back to review.
    pub async fn update(&self, ctx: &AuthContext, id: i64, request: UpdateProductRequest) -> Result<Product> {
        let product = self.find(id).await?;
        ctx.require_manage(product.owner_id)?;

        let fields = ValidatedProduct::merge(&product, &request)?;
        let edited = Product {
            name: fields.name,
            tagline: fields.tagline,
            description: fields.description,
            website_url: fields.website_url,
            logo_url: fields.logo_url,
            category: fields.category,
            ..product
        };

        let resubmit = ctx.user_id() == edited.owner_id;
        let updated = self.products.update(&edited, resubmit).await?;

        info!(product_id = id, user_id = ctx.user_id(), status = %updated.status, "Product updated");
        Ok(updated)
    }

    /// Delete a product with its votes, comments and boost purchases
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let product = self.find(id).await?;
        ctx.require_manage(product.owner_id)?;

        if !self.products.delete(id).await? {
            return Err(LaunchpadError::ProductNotFound(id.to_string()));
        }

        info!(product_id = id, user_id = ctx.user_id(), "Product deleted");
        log_user_action(ctx.user_id(), "delete_product", Some(&product.slug));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            name: "  Acme Rockets ".to_string(),
            tagline: "Rockets for everyone".to_string(),
            description: String::new(),
            website_url: "https://acme.example".to_string(),
            logo_url: Some("  ".to_string()),
            category: "Hardware".to_string(),
        }
    }

    #[test]
    fn test_validation_normalizes_fields() {
        let fields = ValidatedProduct::from_request(&request()).unwrap();
        assert_eq!(fields.name, "Acme Rockets");
        assert_eq!(fields.category, "hardware");
        assert_eq!(fields.logo_url, None);
        assert_eq!(fields.website_url, "https://acme.example/");
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let mut bad = request();
        bad.name = " ".to_string();
        assert_matches!(ValidatedProduct::from_request(&bad), Err(LaunchpadError::InvalidInput(_)));

        let mut bad = request();
        bad.website_url = "javascript:alert(1)".to_string();
        assert_matches!(ValidatedProduct::from_request(&bad), Err(LaunchpadError::InvalidInput(_)));

        let mut bad = request();
        bad.tagline = "x".repeat(MAX_TAGLINE_LENGTH + 1);
        assert_matches!(ValidatedProduct::from_request(&bad), Err(LaunchpadError::InvalidInput(_)));
    }
}
