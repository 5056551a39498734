/*
 * Responsibility
 * - /ai/v1 の URL 構造を定義
 * - Bearer が必要な範囲を route_layer で適用する
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::schema::schema;
use crate::middleware::auth::access;
use crate::state::AppState;

pub const SCHEMA_PATH: &str = "/ai/v1/schema";

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/schema", get(schema));
    access::apply(protected, state)
}
