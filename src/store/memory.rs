//! In-memory lock store
//!
//! Uses DashMap for thread-safe concurrent access. Suitable for tests and
//! single-instance deployments; locks live only as long as the process. For
//! coordination across processes, use the Redis store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::Result;
use crate::store::LockStore;

/// A held lease.
#[derive(Debug, Clone)]
struct LeaseEntry {
    token: String,
    expires_at: Instant,
}

/// In-memory lock store.
///
/// Expired leases are reclaimed lazily: an expired entry is overwritten by
/// the next acquirer and refuses release, exactly as an expired store key
/// would.
pub struct MemoryStore {
    leases: DashMap<String, LeaseEntry>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            leases: DashMap::new(),
        }
    }

    /// Get the number of live leases (for monitoring).
    pub fn lease_count(&self) -> usize {
        let now = Instant::now();
        self.leases
            .iter()
            .filter(|entry| entry.expires_at > now)
            .count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn try_acquire(&self, key: &str, token: &str, lease: Duration) -> Result<bool> {
        let now = Instant::now();
        let entry = LeaseEntry {
            token: token.to_string(),
            expires_at: now + lease,
        };

        // The map entry holds its shard lock, giving the same
        // check-and-set atomicity the store provides remotely
        match self.leases.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at <= now {
                    occupied.insert(entry);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(true)
            }
        }
    }

    async fn release_if_owner(&self, key: &str, token: &str) -> Result<bool> {
        let now = Instant::now();
        let removed = self
            .leases
            .remove_if(key, |_, lease| lease.token == token && lease.expires_at > now);
        Ok(removed.is_some())
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_acquire_and_contend() {
        let store = MemoryStore::new();

        assert!(store.try_acquire("k", "a", LEASE).await.unwrap());
        assert!(!store.try_acquire("k", "b", LEASE).await.unwrap());
        assert_eq!(store.lease_count(), 1);
    }

    #[tokio::test]
    async fn test_release_requires_matching_token() {
        let store = MemoryStore::new();

        store.try_acquire("k", "a", LEASE).await.unwrap();
        assert!(!store.release_if_owner("k", "b").await.unwrap());
        assert!(store.release_if_owner("k", "a").await.unwrap());
        assert!(!store.release_if_owner("k", "a").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lease_is_reclaimable() {
        let store = MemoryStore::new();

        store
            .try_acquire("k", "a", Duration::from_secs(1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // the expired entry refuses release but yields to a new acquirer
        assert!(!store.release_if_owner("k", "a").await.unwrap());
        assert!(store.try_acquire("k", "b", LEASE).await.unwrap());
        assert!(!store.release_if_owner("k", "a").await.unwrap());
        assert!(store.release_if_owner("k", "b").await.unwrap());
    }
}
