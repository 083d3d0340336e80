//! Admin handlers
//!
//! Every route here extracts `AdminUser`, so anonymous requests get `401` and
//! non-admins `403` before any work is done.

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use crate::handlers::extract::{Json, Path, Query};
use crate::middleware::AdminUser;
use crate::models::{
    AdjustPointsRequest, Comment, CommentView, ModerationQuery, PlatformStats, Product, ProductView,
    RejectProductRequest, SalesQuery, SalesReport, SetRoleRequest, User, UserListQuery, UserPage,
};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/products", get(list_products))
        .route("/products/:id/approve", post(approve_product))
        .route("/products/:id/reject", post(reject_product))
        .route("/comments", get(list_comments))
        .route("/comments/:id/hide", post(hide_comment))
        .route("/comments/:id/restore", post(restore_comment))
        .route("/users", get(list_users))
        .route("/users/:id/ban", post(ban_user))
        .route("/users/:id/unban", post(unban_user))
        .route("/users/:id/role", post(set_role))
        .route("/users/:id/points", post(adjust_points))
        .route("/analytics/sales", get(sales_report))
}

async fn stats(State(state): State<AppState>, AdminUser(ctx): AdminUser) -> Result<Json<PlatformStats>> {
    Ok(Json(state.services.admin_service.stats(&ctx).await?))
}

async fn list_products(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Query(query): Query<ModerationQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state
        .services
        .admin_service
        .list_products(&ctx, query.status.as_deref(), query.page, query.per_page)
        .await?;
    Ok(Json(products))
}

async fn approve_product(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    Ok(Json(state.services.admin_service.approve_product(&ctx, id).await?))
}

async fn reject_product(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<RejectProductRequest>,
) -> Result<Json<Product>> {
    let product = state.services.admin_service.reject_product(&ctx, id, &request.reason).await?;
    Ok(Json(product))
}

async fn list_comments(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Query(query): Query<ModerationQuery>,
) -> Result<Json<Vec<CommentView>>> {
    let comments = state
        .services
        .admin_service
        .list_comments(&ctx, query.status.as_deref(), query.page, query.per_page)
        .await?;
    Ok(Json(comments))
}

async fn hide_comment(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Comment>> {
    Ok(Json(state.services.admin_service.hide_comment(&ctx, id).await?))
}

async fn restore_comment(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Comment>> {
    Ok(Json(state.services.admin_service.restore_comment(&ctx, id).await?))
}

async fn list_users(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserPage>> {
    let users = state
        .services
        .admin_service
        .list_users(&ctx, query.q.as_deref(), query.page, query.per_page)
        .await?;
    Ok(Json(users))
}

async fn ban_user(State(state): State<AppState>, AdminUser(ctx): AdminUser, Path(id): Path<i64>) -> Result<Json<User>> {
    Ok(Json(state.services.admin_service.set_ban(&ctx, id, true).await?))
}

async fn unban_user(State(state): State<AppState>, AdminUser(ctx): AdminUser, Path(id): Path<i64>) -> Result<Json<User>> {
    Ok(Json(state.services.admin_service.set_ban(&ctx, id, false).await?))
}

async fn set_role(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.services.admin_service.set_role(&ctx, id, request.role).await?))
}

async fn adjust_points(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<AdjustPointsRequest>,
) -> Result<Json<User>> {
    let user = state
        .services
        .admin_service
        .adjust_points(&ctx, id, request.delta, request.reason.as_deref())
        .await?;
    Ok(Json(user))
}

async fn sales_report(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesReport>> {
    Ok(Json(state.services.admin_service.sales_report(&ctx, query.months).await?))
}
