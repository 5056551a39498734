//! Active/disabled token registries.
//!
//! Both registries are rebuilt on every call from an environment string and a
//! persisted list; nothing is cached here beyond what the config store does.
use std::{collections::HashSet, sync::Arc};

use crate::services::{
    cache::CacheResult,
    hooks::{self, Hooks, RequestMeta},
    tokens::config_store::ConfigStore,
};

pub const ACTIVE_TOKENS_ENV: &str = "AGENTGATE_ACTIVE_TOKENS";
pub const DISABLED_TOKENS_ENV: &str = "AGENTGATE_DISABLED_TOKENS";
pub const ACTIVE_TOKENS_KEY: &str = "tokens:active";
pub const DISABLED_TOKENS_KEY: &str = "tokens:disabled";

pub trait EnvSource: Send + Sync {
    fn get_string(&self, name: &str) -> Option<String>;
}

/// Reads the live process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get_string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticEnv(pub std::collections::HashMap<String, String>);

#[cfg(test)]
impl StaticEnv {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl EnvSource for StaticEnv {
    fn get_string(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Merge a delimiter-separated string (whitespace and/or commas) with a list.
pub fn collect_tokens(raw: Option<&str>, list: Option<Vec<String>>) -> HashSet<String> {
    let from_raw = raw
        .into_iter()
        .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::to_string);

    from_raw
        .chain(list.into_iter().flatten())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct TokenSource {
    env: Arc<dyn EnvSource>,
    config: Arc<dyn ConfigStore>,
    hooks: Hooks,
}

impl TokenSource {
    pub fn new(env: Arc<dyn EnvSource>, config: Arc<dyn ConfigStore>, hooks: Hooks) -> Self {
        Self { env, config, hooks }
    }

    pub async fn active_tokens(&self, meta: &RequestMeta) -> CacheResult<HashSet<String>> {
        let tokens = self.load(ACTIVE_TOKENS_ENV, ACTIVE_TOKENS_KEY).await?;
        Ok(hooks::apply(self.hooks.active_tokens.as_ref(), tokens, meta))
    }

    pub async fn disabled_tokens(&self, meta: &RequestMeta) -> CacheResult<HashSet<String>> {
        let tokens = self.load(DISABLED_TOKENS_ENV, DISABLED_TOKENS_KEY).await?;
        Ok(hooks::apply(self.hooks.disabled_tokens.as_ref(), tokens, meta))
    }

    async fn load(&self, env_name: &str, key: &str) -> CacheResult<HashSet<String>> {
        let raw = self.env.get_string(env_name);
        let list = self.config.get_list(key).await?;
        Ok(collect_tokens(raw.as_deref(), list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        cache::MemoryCache, clock::ManualClock, tokens::config_store::CacheConfigStore,
    };
    use axum::http::Method;

    fn meta() -> RequestMeta {
        RequestMeta::new(Method::GET, "/ai/v1/schema")
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn config_with(active: &[&str]) -> Arc<CacheConfigStore<MemoryCache>> {
        let cache = Arc::new(MemoryCache::new(Arc::new(ManualClock::new(0))));
        let store = CacheConfigStore::new(cache, "test");
        let list: Vec<String> = active.iter().map(|s| s.to_string()).collect();
        store.replace_list(ACTIVE_TOKENS_KEY, &list).await;
        Arc::new(store)
    }

    #[test]
    fn collect_splits_on_whitespace_and_commas() {
        let tokens = collect_tokens(Some(" a, b\n c,,d\t"), None);
        assert_eq!(tokens, set(&["a", "b", "c", "d"]));
    }

    #[test]
    fn collect_merges_and_dedups() {
        let tokens = collect_tokens(
            Some("a,b"),
            Some(vec!["b".into(), " c ".into(), "".into()]),
        );
        assert_eq!(tokens, set(&["a", "b", "c"]));
    }

    #[test]
    fn collect_handles_absent_sources() {
        assert!(collect_tokens(None, None).is_empty());
        assert!(collect_tokens(Some(" , "), Some(vec![])).is_empty());
    }

    #[tokio::test]
    async fn active_tokens_merge_env_and_config() {
        let env = StaticEnv::default().with(ACTIVE_TOKENS_ENV, "env-1 env-2");
        let source = TokenSource::new(
            Arc::new(env),
            config_with(&["cfg-1", "env-1"]).await,
            Hooks::default(),
        );

        let active = source.active_tokens(&meta()).await.unwrap();
        assert_eq!(active, set(&["env-1", "env-2", "cfg-1"]));
        assert!(source.disabled_tokens(&meta()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_can_add_and_remove_tokens() {
        let env = StaticEnv::default()
            .with(ACTIVE_TOKENS_ENV, "keep drop")
            .with(DISABLED_TOKENS_ENV, "old");
        let hooks = Hooks::default()
            .with_active_tokens(|mut tokens, meta| {
                tokens.remove("drop");
                tokens.insert(format!("added-for-{}", meta.method));
                tokens
            })
            .with_disabled_tokens(|_, _| HashSet::new());
        let source = TokenSource::new(Arc::new(env), config_with(&[]).await, hooks);

        assert_eq!(
            source.active_tokens(&meta()).await.unwrap(),
            set(&["keep", "added-for-GET"])
        );
        assert!(source.disabled_tokens(&meta()).await.unwrap().is_empty());
    }
}
