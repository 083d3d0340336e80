//! Rate limiting middleware
//!
//! Per-client request limits for the JSON API. Clients are keyed by the socket
//! peer address, or by the first `x-forwarded-for` address when the server is
//! configured to trust its proxy.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::config::RateLimitConfig;
use crate::state::AppState;
use crate::utils::errors::{LaunchpadError, Result};

/// Rate limiting middleware
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    trust_forwarded_for: bool,
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware")
            .field("clients", &self.limiter.len())
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
    }
}

impl RateLimitMiddleware {
    /// Create a limiter from `[rate_limit]`
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(per_minute);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Client key for a request
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        client_key(headers, peer, self.trust_forwarded_for)
    }

    /// Check if a client may make another request
    pub fn check_rate_limit(&self, client: &str) -> Result<()> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(client = %client, "Rate limit exceeded");
                Err(LaunchpadError::RateLimitExceeded)
            }
        }
    }

    /// Forget clients whose limits have fully replenished
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        debug!(clients = self.limiter.len(), "Rate limit entries cleaned up");
    }
}

/// Client key: the peer IP, or the first `x-forwarded-for` entry when the
/// header comes from a trusted proxy
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = if trust_forwarded_for {
        headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reject requests over the client's quota with `429`
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = state.rate_limiter.client_key(request.headers(), peer);

    match state.rate_limiter.check_rate_limit(&client) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
