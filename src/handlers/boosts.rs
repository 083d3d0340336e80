//! Boost handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use crate::handlers::extract::{Json, Path};
use crate::middleware::CurrentUser;
use crate::models::{BoostPlan, PurchaseBoostRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new().route("/plans", get(plans))
}

async fn plans(State(state): State<AppState>) -> Json<Vec<BoostPlan>> {
    Json(state.services.boost_service.plans().to_vec())
}

/// `POST /api/products/id/:id/boosts`
pub async fn purchase(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<i64>,
    Json(request): Json<PurchaseBoostRequest>,
) -> Result<impl IntoResponse> {
    let receipt = state
        .services
        .boost_service
        .purchase(&ctx, product_id, request.plan.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
