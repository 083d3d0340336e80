//! Redis integration service implementation
//!
//! Prefixed JSON values with expiry and a health check. Session
//! storage and anything else cached in Redis goes through this service.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use crate::config::RedisConfig;
use crate::utils::errors::Result;

/// Redis service for caching and session state
#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
    config: RedisConfig,
}

impl std::fmt::Debug for RedisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisService")
            .field("prefix", &self.config.prefix)
            .finish()
    }
}

impl RedisService {
    /// Connect to Redis; the manager reconnects on its own afterwards
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;

        debug!(prefix = %config.prefix, "Redis connection manager created");
        Ok(Self { manager, config })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Set a value in Redis with TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.manager.clone();
        let serialized = serde_json::to_string(value)?;
        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.config.ttl_seconds);

        redis::cmd("SET")
            .arg(&full_key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl)
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!(key = %full_key, ttl = ttl, "Value set in Redis");
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.manager.clone();
        let full_key = self.full_key(key);

        let result: Option<String> = conn.get(&full_key).await?;

        match result {
            Some(data) => {
                let value = serde_json::from_str::<T>(&data)?;
                debug!(key = %full_key, "Value retrieved from Redis");
                Ok(Some(value))
            }
            None => {
                debug!(key = %full_key, "Key not found in Redis");
                Ok(None)
            }
        }
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let full_key = self.full_key(key);

        let deleted: i64 = conn.del(&full_key).await?;

        debug!(key = %full_key, deleted = deleted > 0, "Key deletion attempted");
        Ok(deleted > 0)
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> bool {
        let mut conn = self.manager.clone();
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;

        match result {
            Ok(response) => response == "PONG",
            Err(e) => {
                warn!(error = %e, "Redis health check failed");
                false
            }
        }
    }
}
