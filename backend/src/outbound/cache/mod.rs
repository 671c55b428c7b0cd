//! Redis-backed cache adapter.
//!
//! Implements the domain [`Cache`] port over a `bb8-redis` pool. Keys are
//! namespaced by their callers (`points:balance:user:<id>`), so this adapter
//! stays a plain string store with per-entry expiry.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;

use crate::domain::ports::{Cache, CacheError};

/// Redis-backed implementation of the [`Cache`] port.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCache {
    /// Connect to Redis at the given URL and build the connection pool.
    ///
    /// # Errors
    /// Returns [`CacheError::Backend`] if the URL is invalid or the pool
    /// cannot be constructed.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let manager =
            RedisConnectionManager::new(url).map_err(|err| CacheError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SET EX takes whole seconds; round a sub-second TTL up to one.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }
}
