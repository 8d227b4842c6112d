//! Lock error types.

use thiserror::Error;

/// Result type for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;

/// Distributed lock errors.
#[derive(Debug, Error)]
pub enum LockError {
    /// Deadline elapsed while the lock stayed contended.
    #[error("Timed out waiting to acquire lock")]
    AcquireTimeout,

    /// The handle no longer holds the lock: it was already released, or its
    /// lease expired and the key was reclaimed.
    #[error("Lock not held by this handle")]
    NotHeld,

    /// The OS randomness source failed while generating an owner token.
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    /// Transport or protocol failure talking to the store.
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Connection pool error.
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LockError {
    /// Check if this error came from the store infrastructure rather than
    /// the lock protocol itself.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Pool(_))
    }

    /// Check if the failed operation may be retried against the store.
    ///
    /// Contention is not an error and is retried by the acquisition policies
    /// themselves; this covers infrastructure failures the caller may choose
    /// to retry once the store recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Pool(_))
    }
}

impl<E> From<bb8::RunError<E>> for LockError
where
    E: std::error::Error + 'static,
{
    fn from(err: bb8::RunError<E>) -> Self {
        Self::Pool(err.to_string())
    }
}
