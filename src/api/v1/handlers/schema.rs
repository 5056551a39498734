/*
 * Responsibility
 * - GET /ai/v1/schema (bearer 必須)
 * - Service name, version, build id and the routes an agent can call
 */
use axum::{Json, extract::State};
use serde::Serialize;

use crate::api::v1::{extractors::AuthCtxExtractor, routes::SCHEMA_PATH};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SchemaRoutes {
    pub schema: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub build: String,
    pub routes: SchemaRoutes,
}

pub async fn schema(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Json<SchemaResponse> {
    tracing::debug!(identity = ctx.identity.as_str(), "schema requested");

    Json(SchemaResponse {
        name: "ai-agentgate",
        version: env!("CARGO_PKG_VERSION"),
        build: state.build.to_str().unwrap_or_default().to_string(),
        routes: SchemaRoutes {
            schema: SCHEMA_PATH,
        },
    })
}
