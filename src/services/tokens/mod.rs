/*
 * Responsibility
 * - Bearer token value type and its derived bucket identity
 * - Header extraction (extractor) and active/disabled registry lookup (source)
 */
pub mod config_store;
pub mod extractor;
pub mod source;

use std::fmt;

use sha2::{Digest, Sha256};

pub use config_store::{CacheConfigStore, ConfigStore};
pub use extractor::{HeaderSources, Lookup};
pub use source::{EnvSource, ProcessEnv, TokenSource};

/// An opaque bearer credential.
///
/// `Debug` is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn identity(&self) -> TokenIdentity {
        TokenIdentity(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Lowercase hex SHA-256 of a token. Safe to store and log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenIdentity(String);

impl TokenIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_stable_hex_sha256() {
        let a = Token::new("tok-A").identity();
        let b = Token::new("tok-A").identity();

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, Token::new("tok-B").identity());
    }

    #[test]
    fn debug_never_prints_the_token() {
        let printed = format!("{:?}", Token::new("super-secret"));
        assert!(!printed.contains("super-secret"));
    }
}
