//! Authentication middleware
//!
//! Extractors that resolve the session cookie (or a bearer token) to the
//! signed-in user, and helpers that set and clear the cookie.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use crate::config::SessionConfig;
use crate::services::AuthContext;
use crate::state::AppState;
use crate::utils::errors::LaunchpadError;

/// Session token from the cookie, or from `Authorization: Bearer`
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// HTTP-only cookie carrying a session token
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Cookie that removes the session cookie from the browser
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .http_only(true)
        .path("/")
        .build()
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<AuthContext>, LaunchpadError> {
    let token = match session_token(&parts.headers, &state.settings.session.cookie_name) {
        Some(token) => token,
        None => return Ok(None),
    };

    let user = state.services.auth_service.authenticate(&token).await?;
    debug!(user_id = user.id, "Request authenticated");
    Ok(Some(AuthContext::new(user)))
}

/// Signed-in user; rejects with `401` otherwise
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = LaunchpadError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or(LaunchpadError::Unauthorized)
    }
}

/// Signed-in user if there is one. Stale sessions count as anonymous.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthContext>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = LaunchpadError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(ctx) => Ok(OptionalUser(ctx)),
            Err(LaunchpadError::Unauthorized) => Ok(OptionalUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Signed-in admin; `401` when anonymous, `403` for other users
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = LaunchpadError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;
        ctx.require_admin()?;
        Ok(AdminUser(ctx))
    }
}
