//! User profile handlers

use axum::extract::State;
use axum::routing::{get, patch};
use axum::Router;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::PageQuery;
use crate::middleware::CurrentUser;
use crate::models::{BoostPurchase, PointsHistory, UpdateUserRequest, User, UserProfile};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", patch(update_me))
        .route("/me/points", get(my_points))
        .route("/me/boosts", get(my_boosts))
        .route("/:username", get(profile))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = state.services.user_service.update_profile(&ctx.user, request).await?;
    Ok(Json(user))
}

async fn my_points(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PointsHistory>> {
    let history = state
        .services
        .user_service
        .points_history(&ctx.user, page.page, page.per_page)
        .await?;
    Ok(Json(history))
}

async fn my_boosts(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BoostPurchase>>> {
    let purchases = state
        .services
        .boost_service
        .history(&ctx.user, page.page, page.per_page)
        .await?;
    Ok(Json(purchases))
}

async fn profile(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<UserProfile>> {
    let profile = state.services.user_service.get_profile(&username).await?;
    Ok(Json(profile))
}
