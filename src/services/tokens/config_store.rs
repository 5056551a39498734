//! Persisted, list-valued configuration entries (token registries).
use async_trait::async_trait;
use std::sync::Arc;

use crate::services::cache::{CacheClient, CacheResult};

#[async_trait]
pub trait ConfigStore: Send + Sync {
    // `Ok(None)` when the entry has never been written or is empty.
    async fn get_list(&self, key: &str) -> CacheResult<Option<Vec<String>>>;
}

/// Config store over cache sets (`SMEMBERS`).
#[derive(Clone)]
pub struct CacheConfigStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl<C: CacheClient> CacheConfigStore<C> {
    pub fn new(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, raw: &str) -> String {
        format!("{}:{}", self.prefix, raw)
    }
}

#[cfg(test)]
impl CacheConfigStore<crate::services::cache::MemoryCache> {
    pub async fn replace_list(&self, key: &str, values: &[String]) {
        self.cache.replace_members(&self.key(key), values).await;
    }
}

#[async_trait]
impl<C: CacheClient> ConfigStore for CacheConfigStore<C> {
    async fn get_list(&self, key: &str) -> CacheResult<Option<Vec<String>>> {
        let members = self.cache.members(&self.key(key)).await?;
        Ok((!members.is_empty()).then_some(members))
    }
}
