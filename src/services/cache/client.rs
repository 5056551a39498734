//! Cache client interface used by the bucket store and the token-list store.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Kept independent from `AppError`: every caller in this crate surfaces it as
/// `store_unavailable`, never as a denial or an empty bucket.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal, string-based cache interface.
///
/// - Rate buckets need `GET` and `SET ... EX`.
/// - Token lists need set members (`SMEMBERS`); they are written by operators,
///   not by this service.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Overwrite a value with TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Members of a set. A missing key is an empty set.
    async fn members(&self, key: &str) -> CacheResult<Vec<String>>;
}

/// Redis `EX` takes whole seconds; anything shorter is rounded up to one.
pub fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
