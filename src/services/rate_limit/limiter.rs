//! Fixed-window "touch-and-get" limiter.
//!
//! Every touch consumes one unit and reports the resulting bucket. The limiter
//! observes and reports; it never rejects or delays the caller.
use std::{sync::Arc, time::Duration};
use tracing::debug;

use crate::services::{
    cache::CacheResult,
    clock::Clock,
    hooks::{self, Hooks, RequestMeta},
    rate_limit::{BucketStore, Identity, RateBucket, locks::KeyedLocks},
};

pub const DEFAULT_RATE_LIMIT: u32 = 120;
pub const DEFAULT_RATE_WINDOW_SECONDS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub limit: u32,
    pub window_seconds: u64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RATE_LIMIT,
            window_seconds: DEFAULT_RATE_WINDOW_SECONDS,
        }
    }
}

pub struct RateLimiter {
    store: Arc<dyn BucketStore>,
    clock: Arc<dyn Clock>,
    policy: RatePolicy,
    hooks: Hooks,
    prefix: String,
    locks: KeyedLocks,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn BucketStore>,
        clock: Arc<dyn Clock>,
        policy: RatePolicy,
        hooks: Hooks,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            hooks,
            prefix: prefix.into(),
            locks: KeyedLocks::default(),
        }
    }

    pub fn bucket_key(&self, identity: &Identity) -> String {
        format!("{}:rl:{}", self.prefix, identity.bucket_suffix())
    }

    /// Consume one unit for `identity` and return the bucket after the decrement.
    ///
    /// Concurrent touches on one key are serialized; the read, decrement and
    /// write happen under the key's lock.
    pub async fn touch(&self, identity: &Identity, meta: &RequestMeta) -> CacheResult<RateBucket> {
        let limit = hooks::apply(self.hooks.rate_limit.as_ref(), self.policy.limit, meta);
        let window = hooks::apply(
            self.hooks.rate_window.as_ref(),
            self.policy.window_seconds,
            meta,
        )
        .max(1);

        let key = self.bucket_key(identity);
        let _guard = self.locks.lock(&key).await;
        let now = self.clock.now();
        let fresh_reset = now.saturating_add(i64::try_from(window).unwrap_or(i64::MAX));

        let bucket = match self.store.get(&key).await? {
            // A stored reset beyond one window from now is corrupt; cap it.
            Some(prev) if now < prev.reset_at => RateBucket {
                limit,
                remaining: prev.remaining.min(limit),
                reset_at: prev.reset_at.min(fresh_reset),
            },
            _ => RateBucket {
                limit,
                remaining: limit,
                reset_at: fresh_reset,
            },
        };
        let bucket = RateBucket {
            remaining: bucket.remaining.saturating_sub(1),
            ..bucket
        };

        // Storage self-expires at the window boundary.
        let ttl = Duration::from_secs(u64::try_from(bucket.reset_at - now).unwrap_or(1).max(1));
        self.store.set(&key, &bucket, ttl).await?;

        debug!(
            identity = identity.kind(),
            limit = bucket.limit,
            remaining = bucket.remaining,
            reset_at = bucket.reset_at,
            "rate bucket touched"
        );
        Ok(bucket)
    }
}
