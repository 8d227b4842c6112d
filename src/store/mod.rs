//! Lock storage backends
//!
//! This module provides the two atomic store primitives every lock operation
//! is built from, behind a backend trait:
//!
//! - **Redis**: pooled connections to a shared store, for coordination
//!   across processes (default)
//! - **Memory**: in-process storage using DashMap, for tests and
//!   single-instance deployments

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Trait for lock storage backends.
///
/// Each method issues exactly one atomic store request and never retries;
/// retry policy belongs to the caller. A transport failure is reported as an
/// error and is distinct from both `Ok` outcomes.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Store `token` at `key` only if the key is absent, with expiry
    /// `lease`. Returns `Ok(true)` when the key was set (lock acquired) and
    /// `Ok(false)` when the key already exists (lock contended).
    async fn try_acquire(&self, key: &str, token: &str, lease: Duration) -> Result<bool>;

    /// Delete `key` only if its stored value equals `token`, as one
    /// indivisible store-side operation. Returns `Ok(true)` when the key was
    /// deleted and `Ok(false)` when it was absent or carried another owner's
    /// token.
    async fn release_if_owner(&self, key: &str, token: &str) -> Result<bool>;

    /// Get store type name for debugging.
    fn store_type(&self) -> &'static str;
}
