/// Factory: build `AppState` from application `Config`.
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::services::{
    auth::Authenticator,
    cache::{CacheClient, CacheError, MemoryCache, ValkeyClient},
    clock::{Clock, SystemClock},
    decorator::ResponseDecorator,
    hooks::Hooks,
    rate_limit::{CacheBucketStore, RateLimiter},
    tokens::{CacheConfigStore, EnvSource, HeaderSources, ProcessEnv, TokenSource},
};
use crate::state::AppState;

pub async fn build_state(config: &Config) -> Result<AppState, CacheError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);

    match &config.valkey_url {
        Some(url) => {
            let cache = Arc::new(ValkeyClient::new(url).await?);
            Ok(assemble(cache, clock, env, Hooks::default(), config))
        }
        None => {
            let cache = Arc::new(MemoryCache::new(clock.clone()));
            Ok(assemble(cache, clock, env, Hooks::default(), config))
        }
    }
}

/// Wire every component over one cache backend.
pub fn assemble<C: CacheClient>(
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    env: Arc<dyn EnvSource>,
    hooks: Hooks,
    config: &Config,
) -> AppState {
    info!(
        backend = cache.backend_name(),
        limit = config.rate_policy.limit,
        window_seconds = config.rate_policy.window_seconds,
        "building gate"
    );

    let tokens = TokenSource::new(
        env,
        Arc::new(CacheConfigStore::new(cache.clone(), config.key_prefix.clone())),
        hooks.clone(),
    );
    let authenticator = Authenticator::new(HeaderSources::default(), tokens);

    let limiter = RateLimiter::new(
        Arc::new(CacheBucketStore::new(cache)),
        clock,
        config.rate_policy,
        hooks,
        config.key_prefix.clone(),
    );
    let decorator = ResponseDecorator::new(Arc::new(limiter), config.build.clone());

    AppState::new(
        Arc::new(authenticator),
        Arc::new(decorator),
        config.build.clone(),
    )
}
