//! Application state
//!
//! Shared handles every request handler and middleware receives.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::services::{ServiceFactory, SessionService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub services: ServiceFactory,
    pub settings: Arc<Settings>,
    pub rate_limiter: RateLimitMiddleware,
}

impl AppState {
    pub fn new(db: DatabaseService, sessions: SessionService, settings: Settings) -> Self {
        let rate_limiter = RateLimitMiddleware::new(&settings.rate_limit);
        let services = ServiceFactory::new(db, sessions, settings.clone());

        Self {
            services,
            settings: Arc::new(settings),
            rate_limiter,
        }
    }
}
