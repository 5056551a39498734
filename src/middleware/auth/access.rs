//! Bearer admission → AuthCtx を extensions に入れる
//!
//! Applied with `route_layer`, so unmatched paths are not authenticated and
//! fall through to the 404 handler.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::{auth::RequestScope, hooks::RequestMeta};
use crate::state::AppState;

/// Require a valid bearer token on every route of `router`.
///
/// ```ignore
/// let v1 = Router::new().route("/schema", get(schema));
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // The decorating layer installs the scope; without it the admission is
    // still enforced but nothing gets counted.
    let scope = match req.extensions().get::<RequestScope>() {
        Some(scope) => scope.clone(),
        None => {
            tracing::warn!("request scope missing; rate headers layer not installed");
            RequestScope::new()
        }
    };
    let meta = RequestMeta::new(req.method().clone(), req.uri().path());

    let ctx = state
        .authenticator
        .authenticate(req.headers(), &meta, &scope)
        .await?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(ctx.token.identity()));

    Ok(next.run(req).await)
}
