use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tracing::info;

use crate::{KeyValueStore, StoreError, StoreResult};

/// Redis implementation of [`KeyValueStore`].
///
/// Holds a multiplexed [`ConnectionManager`]; every call clones the handle,
/// so concurrent requests share one pipelined connection that reconnects on
/// its own after a drop.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Wrap an already established connection manager.
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Connect to `redis_url`, giving up after `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::open(redis_url)?;
        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                StoreError::Redis(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection timed out",
                )))
            })??;
        info!(%redis_url, "Connected to redis");
        Ok(Self::new(connection))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.connection.clone();
        Ok(conn.incr(key, delta).await?)
    }

    async fn decr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.connection.clone();
        Ok(conn.decr(key, delta).await?)
    }

    async fn list_push(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let _: i64 = conn.rpush(key, value).await?;
        Ok(())
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut conn = self.connection.clone();
        Ok(conn.lrange(key, start, stop).await?)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        Ok(())
    }
}
