//! Distributed lock acquisition and release.
//!
//! Every acquisition writes a fresh random owner token under the lock key
//! with a store-enforced expiry. The token is generated once per call and
//! reused across that call's retries, so all retries stand for the same
//! logical acquirer; release deletes the key only if it still carries the
//! caller's token.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::LockConfig;
use crate::error::{LockError, Result};
use crate::store::{LockStore, RedisStore};
use crate::token;

/// Coordinates lock acquisition against a shared store.
///
/// The manager owns no per-lock state; all durable state is the key's
/// existence, value and TTL in the store. It can be shared freely across
/// tasks.
pub struct LockManager {
    store: Arc<dyn LockStore>,
    poll_interval: Duration,
    retry_interval: Duration,
}

impl LockManager {
    /// Connect to the store named by `config` and build a manager over it.
    pub async fn connect(config: &LockConfig) -> Result<Self> {
        let store = RedisStore::connect(config).await?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Build a manager over an existing store backend.
    pub fn with_store(store: Arc<dyn LockStore>, config: &LockConfig) -> Self {
        Self {
            store,
            poll_interval: config.poll_interval,
            retry_interval: config.retry_interval,
        }
    }

    /// Acquire `key`, polling until the lock is granted.
    ///
    /// Loops indefinitely while the key is contended, sleeping a fixed poll
    /// interval between attempts; only a store failure or token-generation
    /// failure ends the wait early. The store record expires after `lease`,
    /// which bounds how long a crashed holder can block others.
    pub async fn acquire(&self, key: &str, lease: Duration) -> Result<LockGuard> {
        check_lease(lease)?;
        let token = token::generate()?;

        loop {
            if self.store.try_acquire(key, &token, lease).await? {
                info!(key = %key, "Acquired lock");
                return Ok(self.guard(key, token, lease));
            }
            debug!(key = %key, "Lock contended, waiting");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Acquire `key`, giving up once `timeout` has elapsed.
    ///
    /// The deadline is checked before every attempt; once it has passed the
    /// call returns [`LockError::AcquireTimeout`] without issuing another
    /// store request. Store failures still abort immediately, so an
    /// infrastructure outage is never reported as a timeout.
    pub async fn acquire_timeout(
        &self,
        key: &str,
        lease: Duration,
        timeout: Duration,
    ) -> Result<LockGuard> {
        check_lease(lease)?;
        let token = token::generate()?;
        let deadline = Instant::now() + timeout;

        loop {
            if Instant::now() >= deadline {
                debug!(key = %key, "Lock still contended at deadline");
                return Err(LockError::AcquireTimeout);
            }
            if self.store.try_acquire(key, &token, lease).await? {
                info!(key = %key, "Acquired lock");
                return Ok(self.guard(key, token, lease));
            }
            debug!(key = %key, "Lock contended, waiting");
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    fn guard(&self, key: &str, token: String, lease: Duration) -> LockGuard {
        LockGuard {
            key: key.to_string(),
            token,
            lease,
            acquired: true,
            store: Arc::clone(&self.store),
        }
    }
}

fn check_lease(lease: Duration) -> Result<()> {
    if lease.is_zero() {
        return Err(LockError::Config(
            "lease duration must be positive".to_string(),
        ));
    }
    Ok(())
}

/// A held lock.
///
/// The guard is the only capability that can release the lock it represents.
/// It holds no store connection; each release borrows one for a single
/// round trip. Dropping an unreleased guard leaves the store record in place
/// until its lease expires. There is no renewal, so a critical section that
/// outlives its lease can be reclaimed by another acquirer.
pub struct LockGuard {
    key: String,
    token: String,
    lease: Duration,
    acquired: bool,
    store: Arc<dyn LockStore>,
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("key", &self.key)
            .field("token", &self.token)
            .field("lease", &self.lease)
            .field("acquired", &self.acquired)
            .finish()
    }
}

impl LockGuard {
    /// Get the lock key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the owner token proving this guard's claim on the key.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get the lease duration requested at acquisition.
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Local view of whether this guard still holds the lock.
    ///
    /// The store stays authoritative: a lease that already expired remotely
    /// is not reflected here until `release` reports it.
    pub fn is_held(&self) -> bool {
        self.acquired
    }

    /// Release the lock.
    ///
    /// The store deletes the key only if it still carries this guard's
    /// token. Returns [`LockError::NotHeld`] when the guard was already
    /// released, or when the lease expired and the key is gone or owned by a
    /// later acquirer; that newer holder's record is never touched. After a
    /// `NotHeld` outcome every further call returns `NotHeld` without
    /// contacting the store. A store failure leaves the guard held locally
    /// so the release can be retried.
    pub async fn release(&mut self) -> Result<()> {
        if !self.acquired {
            return Err(LockError::NotHeld);
        }

        let released = self.store.release_if_owner(&self.key, &self.token).await?;
        self.acquired = false;

        if released {
            debug!(key = %self.key, "Released lock");
            Ok(())
        } else {
            warn!(key = %self.key, "Lock already expired or reclaimed");
            Err(LockError::NotHeld)
        }
    }
}
