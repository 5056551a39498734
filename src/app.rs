/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (HTTP/CORS/rate headers, protected routes は bearer)
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::{Router, routing::get};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{self, v1::handlers::health::health},
    config::Config,
    error::AppError,
    middleware::{cors, http, rate_headers},
    services::factory::build_state,
    state::AppState,
};

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "agentgate listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

fn build_router(state: AppState, config: &Config) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .nest("/ai/v1", api::v1::routes(state.clone()));

    with_layers(routes, state, config)
}

fn with_layers(routes: Router<AppState>, state: AppState, config: &Config) -> Router {
    let app = routes.fallback(not_found).with_state(state.clone());

    let app = cors::apply(app, config);
    let app = http::apply(app, config.request_timeout);

    // Outermost: every response leaving the service gets counted once.
    rate_headers::apply(app, state)
}

async fn not_found() -> AppError {
    AppError::not_found("route")
}
