//! In-process cache used when no Valkey URL is configured (and in tests).
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use crate::services::cache::client::{CacheClient, CacheResult, ttl_seconds};
use crate::services::clock::Clock;

// Seconds between full sweeps of expired entries.
const SWEEP_INTERVAL_SECONDS: i64 = 1;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Set(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    // Unix seconds; `None` never expires.
    expires_at: Option<i64>,
}

impl Entry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    next_sweep: i64,
}

impl Entries {
    fn live(&mut self, key: &str, now: i64) -> Option<&Entry> {
        if self.map.get(key).is_some_and(|e| !e.is_live(now)) {
            self.map.remove(key);
        }
        self.map.get(key)
    }

    // Drops every expired entry, at most once per sweep interval.
    fn sweep(&mut self, now: i64) {
        if now < self.next_sweep {
            return;
        }
        self.map.retain(|_, e| e.is_live(now));
        self.next_sweep = now.saturating_add(SWEEP_INTERVAL_SECONDS);
    }
}

/// Memory-backed `CacheClient` with clock-driven TTL expiry.
///
/// Reads drop the expired key they hit; writes sweep all expired keys, so keys
/// that are never read again do not accumulate.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<Entries>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            clock,
        }
    }

    /// Seed a set value. Tests use this to stand in for an external writer.
    #[cfg(test)]
    pub async fn replace_members(&self, key: &str, members: &[String]) {
        let mut entries = self.entries.lock().await;

        if members.is_empty() {
            entries.map.remove(key);
            return;
        }

        let mut set = members.to_vec();
        set.sort();
        set.dedup();
        entries.map.insert(
            key.to_string(),
            Entry {
                value: Value::Set(set),
                expires_at: None,
            },
        );
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        Ok(match entries.live(key, now) {
            Some(Entry {
                value: Value::Text(s),
                ..
            }) => Some(s.clone()),
            _ => None,
        })
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = self.clock.now();
        let ttl = i64::try_from(ttl_seconds(ttl)).unwrap_or(i64::MAX);
        let mut entries = self.entries.lock().await;

        entries.sweep(now);
        entries.map.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Some(now.saturating_add(ttl)),
            },
        );
        Ok(())
    }

    async fn members(&self, key: &str) -> CacheResult<Vec<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        Ok(match entries.live(key, now) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => members.clone(),
            _ => Vec::new(),
        })
    }
}
