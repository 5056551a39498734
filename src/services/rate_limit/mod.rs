/*
 * Responsibility
 * - Fixed-window rate accounting per identity (hashed token or anonymous)
 * - Bucket persistence over the cache layer
 */
pub mod bucket;
pub mod limiter;
pub mod locks;
pub mod store;

pub use bucket::{Identity, RateBucket};
pub use limiter::{RateLimiter, RatePolicy};
pub use store::{BucketStore, CacheBucketStore};
