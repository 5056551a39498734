//! Pluggable policy filters.
//!
//! Each filter receives the computed default plus the in-flight request's
//! metadata and returns the value to use. Absent filters leave the default
//! untouched.
use std::{collections::HashSet, fmt, sync::Arc};

use axum::http::Method;

/// The slice of the in-flight request that filters are allowed to see.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
}

impl RequestMeta {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

pub type Filter<T> = Arc<dyn Fn(T, &RequestMeta) -> T + Send + Sync>;

#[derive(Clone, Default)]
pub struct Hooks {
    pub active_tokens: Option<Filter<HashSet<String>>>,
    pub disabled_tokens: Option<Filter<HashSet<String>>>,
    pub rate_limit: Option<Filter<u32>>,
    pub rate_window: Option<Filter<u64>>,
}

impl Hooks {
    pub fn with_active_tokens(
        mut self,
        f: impl Fn(HashSet<String>, &RequestMeta) -> HashSet<String> + Send + Sync + 'static,
    ) -> Self {
        self.active_tokens = Some(Arc::new(f));
        self
    }

    pub fn with_disabled_tokens(
        mut self,
        f: impl Fn(HashSet<String>, &RequestMeta) -> HashSet<String> + Send + Sync + 'static,
    ) -> Self {
        self.disabled_tokens = Some(Arc::new(f));
        self
    }

    pub fn with_rate_limit(
        mut self,
        f: impl Fn(u32, &RequestMeta) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.rate_limit = Some(Arc::new(f));
        self
    }

    pub fn with_rate_window(
        mut self,
        f: impl Fn(u64, &RequestMeta) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.rate_window = Some(Arc::new(f));
        self
    }
}

pub fn apply<T>(filter: Option<&Filter<T>>, value: T, meta: &RequestMeta) -> T {
    match filter {
        Some(f) => f(value, meta),
        None => value,
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("active_tokens", &self.active_tokens.is_some())
            .field("disabled_tokens", &self.disabled_tokens.is_some())
            .field("rate_limit", &self.rate_limit.is_some())
            .field("rate_window", &self.rate_window.is_some())
            .finish()
    }
}
