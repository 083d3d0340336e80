//! Account handlers: register, login, logout, current user

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;
use crate::handlers::extract::Json;
use crate::middleware::auth::{removal_cookie, session_cookie, session_token};
use crate::middleware::CurrentUser;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::state::AppState;
use crate::utils::errors::Result;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Body returned when a session is opened. The token is also set as a cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.services.auth_service.register(request).await?;
    let jar = jar.add(session_cookie(&state.settings.session, token.clone()));

    Ok((StatusCode::CREATED, jar, Json(SessionResponse { user, token })))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.services.auth_service.login(request).await?;
    info!(user_id = user.id, "User logged in");
    let jar = jar.add(session_cookie(&state.settings.session, token.clone()));

    Ok((jar, Json(SessionResponse { user, token })))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Result<impl IntoResponse> {
    if let Some(token) = session_token(&headers, &state.settings.session.cookie_name) {
        state.services.auth_service.logout(&token).await?;
    }

    let jar = jar.remove(removal_cookie(&state.settings.session));
    Ok((StatusCode::NO_CONTENT, jar))
}

async fn me(CurrentUser(ctx): CurrentUser) -> Json<User> {
    Json(ctx.user)
}
