//! Bearer token admission.
//!
//! Linear, per request:
//! 1. no credential in any header source -> `missing_token` (401)
//! 2. credential present but not `Bearer <token>` -> `invalid_token` (401)
//! 3. token in the disabled registry -> `token_disabled` (403)
//! 4. active registry empty or without the token -> `token_forbidden` (403)
//! 5. otherwise allow and record the token in the request scope
use axum::http::HeaderMap;
use tracing::warn;

use crate::error::AppError;
use crate::services::{
    auth::context::{AuthenticatedContext, RequestScope},
    hooks::RequestMeta,
    tokens::{HeaderSources, Lookup, Token, TokenSource},
};

#[derive(Clone)]
pub struct Authenticator {
    sources: HeaderSources,
    tokens: TokenSource,
}

impl Authenticator {
    pub fn new(sources: HeaderSources, tokens: TokenSource) -> Self {
        Self { sources, tokens }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        meta: &RequestMeta,
        scope: &RequestScope,
    ) -> Result<AuthenticatedContext, AppError> {
        let token = match self.sources.lookup(headers) {
            Lookup::Found(token) => token,
            Lookup::Absent => return Err(deny(AppError::MissingToken, meta)),
            Lookup::Malformed => return Err(deny(AppError::InvalidToken, meta)),
        };

        if let Err(err) = self.admit(&token, meta).await {
            // Rejected tokens are still counted against their own bucket.
            scope.record_attempt(token);
            return Err(deny(err, meta));
        }

        let context = AuthenticatedContext { token };
        scope.record(context.clone());
        Ok(context)
    }

    async fn admit(&self, token: &Token, meta: &RequestMeta) -> Result<(), AppError> {
        // Disabled wins over active.
        let disabled = self.tokens.disabled_tokens(meta).await?;
        if disabled.contains(token.as_str()) {
            return Err(AppError::TokenDisabled);
        }

        let active = self.tokens.active_tokens(meta).await?;
        if !active.contains(token.as_str()) {
            return Err(AppError::TokenForbidden);
        }

        Ok(())
    }
}

fn deny(err: AppError, meta: &RequestMeta) -> AppError {
    if !matches!(err, AppError::StoreUnavailable(_)) {
        warn!(
            code = err.code(),
            method = %meta.method,
            path = %meta.path,
            "request denied"
        );
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        cache::{CacheError, CacheResult, MemoryCache},
        clock::ManualClock,
        hooks::Hooks,
        rate_limit::Identity,
        tokens::{
            CacheConfigStore, ConfigStore,
            source::{ACTIVE_TOKENS_ENV, DISABLED_TOKENS_ENV, StaticEnv},
        },
    };
    use async_trait::async_trait;
    use axum::http::{HeaderValue, Method, header};
    use std::sync::Arc;

    struct FailingConfig;

    #[async_trait]
    impl ConfigStore for FailingConfig {
        async fn get_list(&self, _key: &str) -> CacheResult<Option<Vec<String>>> {
            Err(CacheError::BackendConnection("refused".into()))
        }
    }

    fn authenticator(active: &str, disabled: &str) -> Authenticator {
        let env = StaticEnv::default()
            .with(ACTIVE_TOKENS_ENV, active)
            .with(DISABLED_TOKENS_ENV, disabled);
        let cache = Arc::new(MemoryCache::new(Arc::new(ManualClock::new(0))));
        let config = Arc::new(CacheConfigStore::new(cache, "test"));
        Authenticator::new(
            HeaderSources::default(),
            TokenSource::new(Arc::new(env), config, Hooks::default()),
        )
    }

    fn bearer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn meta() -> RequestMeta {
        RequestMeta::new(Method::GET, "/ai/v1/schema")
    }

    #[tokio::test]
    async fn allows_active_token_and_records_it() {
        let auth = authenticator("tok-A", "");
        let scope = RequestScope::new();

        let ctx = auth
            .authenticate(&bearer("Bearer tok-A"), &meta(), &scope)
            .await
            .unwrap();

        assert_eq!(ctx.token, Token::new("tok-A"));
        assert_eq!(
            scope.consume(),
            Some(Identity::Token(Token::new("tok-A").identity()))
        );
    }

    #[tokio::test]
    async fn missing_header_is_missing_token() {
        let auth = authenticator("tok-A", "");
        let scope = RequestScope::new();

        let err = auth
            .authenticate(&HeaderMap::new(), &meta(), &scope)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingToken));
        assert_eq!(scope.consume(), Some(Identity::Anonymous));
    }

    #[tokio::test]
    async fn empty_bearer_is_invalid_token() {
        let auth = authenticator("tok-A", "");

        for value in ["Bearer", "Bearer   ", "Basic abc"] {
            let err = auth
                .authenticate(&bearer(value), &meta(), &RequestScope::new())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidToken), "{value}");
        }
    }

    #[tokio::test]
    async fn disabled_check_precedes_active_check() {
        let auth = authenticator("tok-A", "tok-A");
        let scope = RequestScope::new();

        let err = auth
            .authenticate(&bearer("Bearer tok-A"), &meta(), &scope)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TokenDisabled));
        assert_eq!(
            scope.consume(),
            Some(Identity::Token(Token::new("tok-A").identity()))
        );
    }

    #[tokio::test]
    async fn unknown_or_unconfigured_tokens_are_forbidden() {
        let err = authenticator("tok-A", "")
            .authenticate(&bearer("Bearer tok-B"), &meta(), &RequestScope::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TokenForbidden));

        let err = authenticator("", "")
            .authenticate(&bearer("Bearer tok-A"), &meta(), &RequestScope::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TokenForbidden));
    }

    #[tokio::test]
    async fn store_failure_is_not_a_denial() {
        let auth = Authenticator::new(
            HeaderSources::default(),
            TokenSource::new(
                Arc::new(StaticEnv::default()),
                Arc::new(FailingConfig),
                Hooks::default(),
            ),
        );

        let err = auth
            .authenticate(&bearer("Bearer tok-A"), &meta(), &RequestScope::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
