//! Session storage
//!
//! A session maps a random token, carried in a cookie, to a user id. Tokens
//! live in Redis in production; the in-memory store serves development and
//! tests.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use crate::config::{SessionBackend, Settings};
use crate::services::redis::RedisService;
use crate::utils::errors::Result;
use crate::utils::helpers::generate_random_string;

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Backend that persists sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, token: &str, session: &Session, ttl_seconds: u64) -> Result<()>;

    async fn load(&self, token: &str) -> Result<Option<Session>>;

    async fn remove(&self, token: &str) -> Result<()>;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Sessions stored as `session:<token>` keys with a Redis expiry
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    redis: RedisService,
}

impl RedisSessionStore {
    pub fn new(redis: RedisService) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, token: &str, session: &Session, ttl_seconds: u64) -> Result<()> {
        self.redis.set(&Self::key(token), session, Some(ttl_seconds)).await
    }

    async fn load(&self, token: &str) -> Result<Option<Session>> {
        self.redis.get(&Self::key(token)).await
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.redis.delete(&Self::key(token)).await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.redis.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Process-local sessions. Expired entries are dropped when read and swept
/// whenever a new session is saved.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, token: &str, session: &Session, _ttl_seconds: u64) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| !existing.is_expired(now));
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "Expired sessions pruned");
        }
        sessions.insert(token.to_string(), session.clone());
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>> {
        let session = self.sessions.read().await.get(token).cloned();

        match session {
            Some(session) if session.is_expired(Utc::now()) => {
                self.sessions.write().await.remove(token);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Issues and resolves session tokens
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl_seconds: u64,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("backend", &self.store.backend_name())
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Build the store selected by `[session].backend`
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match settings.session.backend {
            SessionBackend::Redis => {
                let redis = RedisService::connect(settings.redis.clone()).await?;
                Arc::new(RedisSessionStore::new(redis))
            }
            SessionBackend::Memory => {
                warn!("Using in-memory sessions; they are lost on restart");
                Arc::new(MemorySessionStore::new())
            }
        };

        Ok(Self::new(store, settings.session.ttl_seconds))
    }

    /// Open a session for a user and return its token
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let token = generate_random_string(TOKEN_LENGTH);
        let now = Utc::now();
        let session = Session {
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds as i64),
        };

        self.store.save(&token, &session, self.ttl_seconds).await?;
        debug!(user_id = user_id, backend = self.store.backend_name(), "Session created");
        Ok(token)
    }

    /// User id behind a token, if the session is still alive
    pub async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        if token.len() != TOKEN_LENGTH {
            return Ok(None);
        }

        let session = self.store.load(token).await?;
        Ok(session
            .filter(|s| !s.is_expired(Utc::now()))
            .map(|s| s.user_id))
    }

    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.store.remove(token).await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}
