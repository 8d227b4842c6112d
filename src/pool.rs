//! Store connection pool.

use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use tracing::info;

use crate::config::LockConfig;
use crate::error::{LockError, Result};

/// Shared pool of connections to the coordination store.
pub type StorePool = Pool<RedisConnectionManager>;

/// Builder for store connection pools.
pub struct StorePoolBuilder {
    config: LockConfig,
}

impl StorePoolBuilder {
    /// Create a new pool builder.
    pub fn new(config: LockConfig) -> Self {
        Self { config }
    }

    /// Build the connection pool.
    pub async fn build(self) -> Result<StorePool> {
        self.config.validate()?;

        let manager = RedisConnectionManager::new(self.config.url.clone())?;

        let pool = Pool::builder()
            .max_size(self.config.pool_size)
            .min_idle(self.config.min_idle)
            .connection_timeout(self.config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| LockError::Pool(e.to_string()))?;

        // Test the connection in a scope so it is back in the pool before
        // the pool is handed out
        {
            let mut conn = pool
                .get()
                .await
                .map_err(|e| LockError::Pool(e.to_string()))?;
            let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        }

        info!(
            pool_size = self.config.pool_size,
            url = %self.config.url,
            "Store connection pool created"
        );

        Ok(pool)
    }
}
