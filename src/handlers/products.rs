//! Product handlers
//!
//! Listings are addressed by slug; changes by numeric id under `/id/:id`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::Router;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::{boosts, comments};
use crate::middleware::{CurrentUser, OptionalUser};
use crate::models::{
    CreateProductRequest, Product, ProductPage, ProductQuery, ProductView, UpdateProductRequest, VoteOutcome,
};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/:slug", get(show))
        .route("/id/:id", patch(update).delete(remove))
        .route("/id/:id/vote", post(vote).delete(unvote))
        .route("/id/:id/comments", get(comments::list).post(comments::add))
        .route("/id/:id/boosts", post(boosts::purchase))
}

async fn list(State(state): State<AppState>, Query(query): Query<ProductQuery>) -> Result<Json<ProductPage>> {
    let page = state.services.product_service.list(query).await?;
    Ok(Json(page))
}

async fn submit(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let product = state.services.product_service.submit(&ctx.user, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn show(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let product = state.services.product_service.get(&slug, viewer.as_ref()).await?;
    Ok(Json(product))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let product = state.services.product_service.update(&ctx, id, request).await?;
    Ok(Json(product))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.services.product_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vote(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<VoteOutcome>> {
    let outcome = state.services.vote_service.vote(&ctx.user, id).await?;
    Ok(Json(outcome))
}

async fn unvote(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<VoteOutcome>> {
    let outcome = state.services.vote_service.unvote(&ctx.user, id).await?;
    Ok(Json(outcome))
}
