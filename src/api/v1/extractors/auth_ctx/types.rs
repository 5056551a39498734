/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - The raw token stays inside the middleware; handlers only see its hash.
 */
use crate::services::tokens::TokenIdentity;

#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: TokenIdentity,
}

impl AuthCtx {
    pub fn new(identity: TokenIdentity) -> Self {
        Self { identity }
    }
}
