/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - authenticator: bearer token admission
 *   - decorator: rate accounting + response headers
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use axum::http::HeaderValue;

use crate::services::{auth::Authenticator, decorator::ResponseDecorator};

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub decorator: Arc<ResponseDecorator>,
    pub build: HeaderValue,
}

impl AppState {
    pub fn new(
        authenticator: Arc<Authenticator>,
        decorator: Arc<ResponseDecorator>,
        build: HeaderValue,
    ) -> Self {
        Self {
            authenticator,
            decorator,
            build,
        }
    }
}
