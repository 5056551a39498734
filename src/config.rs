/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS, Valkey, rate policy, build id)
 * - 設定値のバリデーション (不正なら起動失敗)
 *
 * Token lists are deliberately not read here: they are re-read from the
 * environment on every authentication check.
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::services::rate_limit::RatePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    // None => in-process memory cache.
    pub valkey_url: Option<String>,
    pub key_prefix: String,

    pub build: HeaderValue,
    pub rate_policy: RatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            valkey_url: None,
            key_prefix: "agentgate".to_string(),
            build: HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
            rate_policy: RatePolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = parse_or(&get, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECONDS", 30)?);

        let valkey_url = get("VALKEY_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let key_prefix = get("AGENTGATE_KEY_PREFIX")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.key_prefix);

        let build = match get("AGENTGATE_BUILD") {
            Some(raw) => HeaderValue::from_str(raw.trim())
                .map_err(|_| ConfigError::Invalid("AGENTGATE_BUILD"))?,
            None => defaults.build,
        };

        let limit = parse_or(&get, "AGENTGATE_RATE_LIMIT", defaults.rate_policy.limit)?;
        let window_seconds = parse_or(
            &get,
            "AGENTGATE_RATE_WINDOW_SECONDS",
            defaults.rate_policy.window_seconds,
        )?;
        if window_seconds == 0 {
            return Err(ConfigError::Invalid("AGENTGATE_RATE_WINDOW_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            valkey_url,
            key_prefix,
            build,
            rate_policy: RatePolicy {
                limit,
                window_seconds,
            },
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
