//! Comment handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::Router;
use crate::handlers::extract::{Json, Path};
use crate::middleware::{CurrentUser, OptionalUser};
use crate::models::{Comment, CommentView, CreateCommentRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:id", delete(remove))
        .route("/:id/report", post(report))
}

/// `GET /api/products/id/:id/comments`
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(product_id): Path<i64>,
) -> Result<Json<Vec<CommentView>>> {
    let comments = state.services.comment_service.list(product_id, viewer.as_ref()).await?;
    Ok(Json(comments))
}

/// `POST /api/products/id/:id/comments`
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(product_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse> {
    let comment = state.services.comment_service.add(&ctx.user, product_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.services.comment_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn report(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Comment>> {
    let comment = state.services.comment_service.report(&ctx.user, id).await?;
    Ok(Json(comment))
}
