//! Rate accounting and telemetry headers for every response.
//!
//! This is the single point where the limiter is touched. It owns the
//! request-local `RequestScope`: created here, handed down through the request
//! extensions, consumed here once the inner service has answered.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::services::{auth::RequestScope, hooks::RequestMeta};
use crate::state::AppState;

/// Wrap `router` (apply last so it is the outermost layer and also sees
/// responses produced by timeouts, CORS preflights and 404s).
pub fn apply(router: Router, state: AppState) -> Router {
    router.layer(middleware::from_fn_with_state(state, decorate_middleware))
}

async fn decorate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let scope = RequestScope::new();
    req.extensions_mut().insert(scope.clone());
    let meta = RequestMeta::new(req.method().clone(), req.uri().path());

    let response = next.run(req).await;

    state.decorator.decorate(&scope, &meta, response).await
}
