/*
 * Responsibility
 * - Per-request association between a request and the token that authenticated it
 * - Consumed exactly once when the response is decorated
 *
 * Notes
 * - The scope is created fresh for every request and travels in the request
 *   extensions; it is dropped with the request.
 */
use std::sync::{Arc, Mutex, PoisonError};

use crate::services::{rate_limit::Identity, tokens::Token};

/// The token that authenticated the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    pub token: Token,
}

#[derive(Debug, Default)]
struct ScopeState {
    context: Option<AuthenticatedContext>,
    // Parsed but rejected token; counted instead of the anonymous bucket.
    attempted: Option<Token>,
    consumed: bool,
}

/// Request-local slot shared between the authenticator and the decorator.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    state: Arc<Mutex<ScopeState>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, context: AuthenticatedContext) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.context = Some(context);
    }

    pub fn record_attempt(&self, token: Token) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.attempted = Some(token);
    }

    /// Read-and-clear. Yields the identity to count on the first call only.
    pub fn consume(&self) -> Option<Identity> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.consumed {
            return None;
        }
        state.consumed = true;

        let token = state
            .context
            .take()
            .map(|ctx| ctx.token)
            .or_else(|| state.attempted.take());

        Some(match token {
            Some(token) => Identity::Token(token.identity()),
            None => Identity::Anonymous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_scope_is_anonymous_once() {
        let scope = RequestScope::new();
        assert_eq!(scope.consume(), Some(Identity::Anonymous));
        assert_eq!(scope.consume(), None);
    }

    #[test]
    fn authenticated_token_wins_over_attempts() {
        let scope = RequestScope::new();
        scope.record_attempt(Token::new("other"));
        scope.record(AuthenticatedContext {
            token: Token::new("tok-A"),
        });

        assert_eq!(
            scope.consume(),
            Some(Identity::Token(Token::new("tok-A").identity()))
        );
        assert_eq!(scope.consume(), None);
    }

    #[test]
    fn clones_share_the_same_slot() {
        let scope = RequestScope::new();
        let handle = scope.clone();
        handle.record_attempt(Token::new("rejected"));

        assert_eq!(
            scope.consume(),
            Some(Identity::Token(Token::new("rejected").identity()))
        );
        assert_eq!(handle.consume(), None);
    }
}
