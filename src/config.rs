//! Lock manager configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{LockError, Result};

/// Configuration for the lock manager and its store connection pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Redis URL (redis://host:port or rediss://host:port for TLS).
    pub url: String,
    /// Connection pool size.
    pub pool_size: u32,
    /// Minimum idle connections.
    pub min_idle: Option<u32>,
    /// Connection timeout.
    #[serde(with = "duration_millis", default = "default_connection_timeout")]
    pub connection_timeout: Duration,
    /// Prefix prepended to every lock key in the store. Empty disables
    /// prefixing.
    pub key_prefix: String,
    /// Fixed wait between attempts of a blocking acquisition.
    #[serde(with = "duration_millis", default = "default_poll_interval")]
    pub poll_interval: Duration,
    /// Fixed wait between attempts of a deadline-bounded acquisition.
    #[serde(with = "duration_millis", default = "default_retry_interval")]
    pub retry_interval: Duration,
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_retry_interval() -> Duration {
    Duration::from_millis(50)
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            min_idle: Some(1),
            connection_timeout: default_connection_timeout(),
            key_prefix: "lock".to_string(),
            poll_interval: default_poll_interval(),
            retry_interval: default_retry_interval(),
        }
    }
}

impl LockConfig {
    /// Create a new configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a builder.
    pub fn builder() -> LockConfigBuilder {
        LockConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// `REDLEASE_URL` takes precedence over `REDIS_URL`; `REDLEASE_POOL_SIZE`
    /// and `REDLEASE_KEY_PREFIX` override their defaults.
    pub fn from_env() -> LockConfigBuilder {
        let mut builder = LockConfigBuilder::new();

        if let Ok(url) = std::env::var("REDLEASE_URL") {
            builder = builder.url(url);
        } else if let Ok(url) = std::env::var("REDIS_URL") {
            builder = builder.url(url);
        }

        if let Ok(pool_size) = std::env::var("REDLEASE_POOL_SIZE")
            && let Ok(size) = pool_size.parse()
        {
            builder = builder.pool_size(size);
        }

        if let Ok(prefix) = std::env::var("REDLEASE_KEY_PREFIX") {
            builder = builder.key_prefix(prefix);
        }

        builder
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(LockError::Config("empty store url".to_string()));
        }
        if let Some(min_idle) = self.min_idle
            && min_idle > self.pool_size
        {
            return Err(LockError::Config(
                "pool_size must be greater than or equal to min_idle".to_string(),
            ));
        }
        if self.poll_interval.is_zero() || self.retry_interval.is_zero() {
            return Err(LockError::Config(
                "poll and retry intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for lock configuration.
#[derive(Default)]
pub struct LockConfigBuilder {
    config: LockConfig,
}

impl LockConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: LockConfig::default(),
        }
    }

    /// Set the store URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the pool size.
    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the minimum idle connections.
    pub fn min_idle(mut self, min_idle: u32) -> Self {
        self.config.min_idle = Some(min_idle);
        self
    }

    /// Set the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set the key prefix. An empty prefix stores lock keys verbatim.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the blocking acquisition poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the deadline-bounded acquisition retry interval.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.retry_interval = interval;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LockConfig {
        self.config
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LockConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.key_prefix, "lock");
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.retry_interval, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LockConfig::builder()
            .url("redis://cache.internal:6380")
            .pool_size(4)
            .key_prefix("jobs")
            .poll_interval(Duration::from_millis(250))
            .build();

        assert_eq!(config.url, "redis://cache.internal:6380");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.key_prefix, "jobs");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_bad_pool_bounds() {
        let config = LockConfig::builder().pool_size(2).min_idle(5).build();
        assert!(matches!(config.validate(), Err(LockError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = LockConfig::builder().url("").build();
        assert!(matches!(config.validate(), Err(LockError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = LockConfig::builder().poll_interval(Duration::ZERO).build();
        assert!(matches!(config.validate(), Err(LockError::Config(_))));
    }
}
