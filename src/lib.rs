//! # redlease
//!
//! Distributed locks over a shared Redis-compatible store.
//!
//! Callers in independent processes acquire a named lock, do bounded work,
//! and release it. Each acquisition stores a random owner token under the
//! lock key with a store-enforced expiry (the lease), so a crashed holder
//! blocks others for at most one lease duration.
//!
//! ## Features
//!
//! - **Atomic acquisition**: one `SET NX PX` round trip per attempt; the
//!   store's set-if-absent guarantees a single holder per key
//! - **Ownership-checked release**: a server-side compare-and-delete script,
//!   never a read followed by a separate delete
//! - **Two wait policies**: block until the lock is granted, or give up at a
//!   caller-supplied deadline
//! - **Pluggable backends**: pooled Redis for cross-process coordination, an
//!   in-memory store for tests and single-instance use
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use redlease::{LockConfig, LockManager};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LockConfig::builder()
//!         .url("redis://localhost:6379")
//!         .build();
//!     let locks = LockManager::connect(&config).await?;
//!
//!     let mut guard = locks
//!         .acquire_timeout("job:42", Duration::from_secs(10), Duration::from_secs(1))
//!         .await?;
//!
//!     // critical section
//!
//!     guard.release().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lease semantics
//!
//! There is no lease renewal: a critical section that outlives its lease can
//! be silently reclaimed by another acquirer while the original holder still
//! believes it holds the lock (its eventual release then reports
//! [`LockError::NotHeld`] and leaves the new holder untouched). Size leases
//! to the work they protect.

mod config;
mod error;
mod lock;
mod pool;
mod store;
mod token;

pub use config::{LockConfig, LockConfigBuilder};
pub use error::{LockError, Result};
pub use lock::{LockGuard, LockManager};
pub use pool::{StorePool, StorePoolBuilder};
pub use store::{LockStore, MemoryStore, RedisStore};

// Re-export redis for callers that build their own pools.
pub use redis;

/// Prelude for common imports.
///
/// ```
/// use redlease::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{LockConfig, LockConfigBuilder};
    pub use crate::error::{LockError, Result};
    pub use crate::lock::{LockGuard, LockManager};
    pub use crate::store::{LockStore, MemoryStore, RedisStore};
}
