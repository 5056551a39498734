//! Rate bucket persistence.
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::debug;

use crate::services::{
    cache::{CacheClient, CacheError, CacheResult},
    rate_limit::RateBucket,
};

/// Bucket storage shared by every worker.
///
/// Backend failures are returned as `Err`; undecodable payloads are not
/// failures and read as `None`.
#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<RateBucket>>;

    async fn set(&self, key: &str, bucket: &RateBucket, ttl: Duration) -> CacheResult<()>;
}

/// Buckets serialized as JSON strings in a `CacheClient`.
#[derive(Clone)]
pub struct CacheBucketStore<C: CacheClient> {
    cache: Arc<C>,
}

impl<C: CacheClient> CacheBucketStore<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<C: CacheClient> BucketStore for CacheBucketStore<C> {
    async fn get(&self, key: &str) -> CacheResult<Option<RateBucket>> {
        let Some(raw) = self.cache.get_string(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<RateBucket>(&raw) {
            Ok(bucket) => Ok(Some(bucket)),
            Err(err) => {
                debug!(
                    key,
                    backend = self.cache.backend_name(),
                    error = %err,
                    "discarding malformed rate bucket"
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, bucket: &RateBucket, ttl: Duration) -> CacheResult<()> {
        let raw =
            serde_json::to_string(bucket).map_err(|e| CacheError::InvalidValue(e.to_string()))?;
        self.cache.set_with_ttl(key, &raw, ttl).await
    }
}
