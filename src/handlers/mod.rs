//! HTTP handlers module
//!
//! JSON API handlers grouped by resource. Each submodule exposes a `routes()`
//! router that is nested under `/api`.

pub mod admin;
pub mod auth;
pub mod boosts;
pub mod comments;
pub mod extract;
pub mod health;
pub mod products;
pub mod users;

use std::time::Duration;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::warn;
use crate::config::ServerConfig;
use crate::middleware::logging::log_requests;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;
use crate::utils::errors::LaunchpadError;

/// `?page=&per_page=` for paginated endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/users", users::routes())
        .nest("/products", products::routes())
        .nest("/comments", comments::routes())
        .nest("/boosts", boosts::routes())
        .nest("/admin", admin::routes())
        .fallback(api_not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit));

    let mut app = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api);

    if let Some(dir) = &state.settings.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(from_fn(log_requests))
        .layer(cors_layer(&state.settings.server))
        .with_state(state)
}

async fn api_not_found() -> LaunchpadError {
    LaunchpadError::NotFound("no such endpoint".to_string())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}
