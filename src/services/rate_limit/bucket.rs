use serde::{Deserialize, Serialize};

use crate::services::tokens::TokenIdentity;

/// Fixed-window counter state for one identity.
///
/// `remaining` is unsigned and clamped to `limit` on every touch, so
/// `0 <= remaining <= limit` holds for anything the limiter hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBucket {
    pub limit: u32,
    pub remaining: u32,
    // Unix seconds.
    pub reset_at: i64,
}

/// Which bucket a request is counted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Token(TokenIdentity),
    // One bucket shared by every caller without a resolvable token.
    Anonymous,
}

impl Identity {
    pub fn bucket_suffix(&self) -> &str {
        match self {
            Identity::Token(id) => id.as_str(),
            Identity::Anonymous => "anon",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Token(_) => "token",
            Identity::Anonymous => "anonymous",
        }
    }
}
