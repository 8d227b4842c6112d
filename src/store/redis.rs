//! Redis lock store
//!
//! Backs locks with a shared Redis-compatible store so acquirers in
//! independent processes exclude each other. Both primitives run as single
//! atomic server-side operations.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use crate::config::LockConfig;
use crate::error::Result;
use crate::pool::{StorePool, StorePoolBuilder};
use crate::store::LockStore;

/// Delete the key only if it still carries the caller's token, as one
/// server-side operation. A GET followed by a DEL in separate round trips
/// would let another acquirer take the key in between.
const RELEASE_SCRIPT: &str = r#"
    if redis.call("get", KEYS[1]) == ARGV[1] then
        return redis.call("del", KEYS[1])
    else
        return 0
    end
"#;

/// Redis-backed lock store.
///
/// A connection is checked out of the pool for each primitive call and
/// returned as soon as the call completes, so waiting acquirers never pin
/// pool capacity between attempts.
pub struct RedisStore {
    pool: StorePool,
    prefix: String,
}

impl RedisStore {
    /// Connect to the store named by `config` and verify the connection.
    pub async fn connect(config: &LockConfig) -> Result<Self> {
        let pool = StorePoolBuilder::new(config.clone()).build().await?;
        Ok(Self::from_pool(pool, config.key_prefix.clone()))
    }

    /// Wrap an existing connection pool.
    pub fn from_pool(pool: StorePool, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    /// Get the full storage key with prefix.
    fn storage_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl LockStore for RedisStore {
    async fn try_acquire(&self, key: &str, token: &str, lease: Duration) -> Result<bool> {
        let storage_key = self.storage_key(key);
        let mut conn = self.pool.get().await?;

        // SET NX PX: set only if absent, with expiry. A nil reply means the
        // key already exists and the set was a no-op.
        let reply: Option<String> = redis::cmd("SET")
            .arg(&storage_key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(lease.as_millis() as u64)
            .query_async(&mut *conn)
            .await?;

        trace!(key = %storage_key, acquired = reply.is_some(), "Conditional set");
        Ok(reply.is_some())
    }

    async fn release_if_owner(&self, key: &str, token: &str) -> Result<bool> {
        let storage_key = self.storage_key(key);
        let mut conn = self.pool.get().await?;

        let deleted: i32 = redis::Script::new(RELEASE_SCRIPT)
            .key(&storage_key)
            .arg(token)
            .invoke_async(&mut *conn)
            .await?;

        trace!(key = %storage_key, deleted = deleted == 1, "Compare-and-delete");
        Ok(deleted == 1)
    }

    fn store_type(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_prefix(prefix: &str) -> RedisStore {
        // The pool is never touched by storage_key, so a lazily failing
        // manager is enough for key tests
        let manager =
            bb8_redis::RedisConnectionManager::new("redis://localhost:6379").unwrap();
        let pool = bb8::Pool::builder().build_unchecked(manager);
        RedisStore::from_pool(pool, prefix)
    }

    #[tokio::test]
    async fn test_storage_key_prefixed() {
        let store = store_with_prefix("lock");
        assert_eq!(store.storage_key("job:42"), "lock:job:42");
    }

    #[tokio::test]
    async fn test_storage_key_unprefixed() {
        let store = store_with_prefix("");
        assert_eq!(store.storage_key("job:42"), "job:42");
    }
}
