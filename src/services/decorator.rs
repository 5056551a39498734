/*
 * Responsibility
 * - Runs once per request after the downstream produced a response
 *   (errors arrive already rendered through `AppError: IntoResponse`)
 * - Consumes the request scope, touches the limiter exactly once, stamps headers
 * - Body and status are left untouched unless the bucket store fails (500)
 */
use std::sync::Arc;

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::{
    auth::RequestScope,
    hooks::RequestMeta,
    rate_limit::{RateBucket, RateLimiter},
};

pub const BUILD_HEADER: HeaderName = HeaderName::from_static("x-agentgate-build");
pub const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

pub struct ResponseDecorator {
    limiter: Arc<RateLimiter>,
    build: HeaderValue,
}

impl ResponseDecorator {
    pub fn new(limiter: Arc<RateLimiter>, build: HeaderValue) -> Self {
        Self { limiter, build }
    }

    pub async fn decorate(
        &self,
        scope: &RequestScope,
        meta: &RequestMeta,
        mut response: Response,
    ) -> Response {
        // Already decorated for this request.
        let Some(identity) = scope.consume() else {
            return response;
        };

        match self.limiter.touch(&identity, meta).await {
            Ok(bucket) => self.stamp(response.headers_mut(), &bucket),
            Err(err) => {
                response = AppError::from(err).into_response();
                response
                    .headers_mut()
                    .insert(BUILD_HEADER, self.build.clone());
            }
        }
        response
    }

    // `insert` replaces, so each header appears exactly once.
    fn stamp(&self, headers: &mut HeaderMap, bucket: &RateBucket) {
        headers.insert(BUILD_HEADER, self.build.clone());
        headers.insert(LIMIT_HEADER, HeaderValue::from(bucket.limit));
        headers.insert(REMAINING_HEADER, HeaderValue::from(bucket.remaining));
        headers.insert(RESET_HEADER, HeaderValue::from(bucket.reset_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        cache::{CacheError, CacheResult, MemoryCache},
        clock::ManualClock,
        hooks::Hooks,
        rate_limit::{BucketStore, CacheBucketStore, RatePolicy},
        tokens::Token,
    };
    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};
    use std::time::Duration;

    struct DownStore;

    #[async_trait]
    impl BucketStore for DownStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<RateBucket>> {
            Err(CacheError::BackendConnection("refused".into()))
        }

        async fn set(&self, _key: &str, _b: &RateBucket, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::BackendConnection("refused".into()))
        }
    }

    fn decorator_with(store: Arc<dyn BucketStore>) -> ResponseDecorator {
        let clock = Arc::new(ManualClock::new(1_000));
        let limiter = RateLimiter::new(
            store,
            clock,
            RatePolicy {
                limit: 2,
                window_seconds: 60,
            },
            Hooks::default(),
            "test",
        );
        ResponseDecorator::new(Arc::new(limiter), HeaderValue::from_static("build-7"))
    }

    fn decorator() -> ResponseDecorator {
        let cache = Arc::new(MemoryCache::new(Arc::new(ManualClock::new(1_000))));
        decorator_with(Arc::new(CacheBucketStore::new(cache)))
    }

    fn meta() -> RequestMeta {
        RequestMeta::new(Method::GET, "/health")
    }

    fn header<'a>(res: &'a Response, name: &HeaderName) -> Vec<&'a str> {
        res.headers()
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn stamps_all_headers_once_and_keeps_status() {
        let d = decorator();
        let scope = RequestScope::new();

        let mut downstream = StatusCode::ACCEPTED.into_response();
        downstream
            .headers_mut()
            .insert(REMAINING_HEADER, HeaderValue::from_static("stale"));

        let res = d.decorate(&scope, &meta(), downstream).await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(header(&res, &BUILD_HEADER), vec!["build-7"]);
        assert_eq!(header(&res, &LIMIT_HEADER), vec!["2"]);
        assert_eq!(header(&res, &REMAINING_HEADER), vec!["1"]);
        assert_eq!(header(&res, &RESET_HEADER), vec!["1060"]);
    }

    #[tokio::test]
    async fn error_responses_are_decorated() {
        let d = decorator();
        let res = d
            .decorate(
                &RequestScope::new(),
                &meta(),
                AppError::MissingToken.into_response(),
            )
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(header(&res, &REMAINING_HEADER), vec!["1"]);
    }

    #[tokio::test]
    async fn second_pass_does_not_touch_again() {
        let d = decorator();
        let scope = RequestScope::new();

        let res = d.decorate(&scope, &meta(), StatusCode::OK.into_response()).await;
        let res = d.decorate(&scope, &meta(), res).await;
        assert_eq!(header(&res, &REMAINING_HEADER), vec!["1"]);

        // A fresh request sees exactly one prior touch.
        let res = d
            .decorate(&RequestScope::new(), &meta(), StatusCode::OK.into_response())
            .await;
        assert_eq!(header(&res, &REMAINING_HEADER), vec!["0"]);
    }

    #[tokio::test]
    async fn authenticated_and_anonymous_buckets_differ() {
        let d = decorator();

        let scope = RequestScope::new();
        scope.record(crate::services::auth::AuthenticatedContext {
            token: Token::new("tok-A"),
        });
        d.decorate(&scope, &meta(), StatusCode::OK.into_response())
            .await;

        let res = d
            .decorate(&RequestScope::new(), &meta(), StatusCode::OK.into_response())
            .await;
        assert_eq!(header(&res, &REMAINING_HEADER), vec!["1"]);
    }

    #[tokio::test]
    async fn store_failure_becomes_500() {
        let d = decorator_with(Arc::new(DownStore));
        let res = d
            .decorate(&RequestScope::new(), &meta(), StatusCode::OK.into_response())
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header(&res, &BUILD_HEADER), vec!["build-7"]);
        assert!(res.headers().get(LIMIT_HEADER).is_none());
    }
}
