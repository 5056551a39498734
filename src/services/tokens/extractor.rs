//! Bearer token extraction from request headers.
use axum::http::{HeaderMap, HeaderName, header};

use super::Token;

/// Server-apparatus variant of the credential header (CGI-style fronts).
pub const APPARATUS_AUTHORIZATION: &str = "x-http-authorization";
/// Credential forwarded by a reverse proxy that strips `Authorization`.
pub const FORWARDED_AUTHORIZATION: &str = "x-forwarded-authorization";
/// Credential re-attached by a proxy after an internal redirect.
pub const REDIRECT_AUTHORIZATION: &str = "x-redirect-http-authorization";

/// Parse `Bearer <token>` (scheme case-insensitive, surrounding whitespace ignored).
pub fn parse_bearer(value: &str) -> Option<Token> {
    let (scheme, rest) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(Token::new(token))
}

/// Outcome of probing every credential header source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Token),
    // At least one source carried a value, none of them parsed.
    Malformed,
    Absent,
}

/// Ordered list of headers that may carry the bearer credential.
#[derive(Debug, Clone)]
pub struct HeaderSources {
    sources: Vec<HeaderName>,
}

impl Default for HeaderSources {
    fn default() -> Self {
        Self::new(vec![
            header::AUTHORIZATION,
            HeaderName::from_static(APPARATUS_AUTHORIZATION),
            HeaderName::from_static(FORWARDED_AUTHORIZATION),
            HeaderName::from_static(REDIRECT_AUTHORIZATION),
        ])
    }
}

impl HeaderSources {
    pub fn new(sources: Vec<HeaderName>) -> Self {
        Self { sources }
    }

    /// The first source that yields a parsable token wins.
    pub fn lookup(&self, headers: &HeaderMap) -> Lookup {
        let mut seen = false;

        for name in &self.sources {
            let Some(value) = headers.get(name) else {
                continue;
            };
            let Ok(value) = value.to_str() else {
                seen = true;
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }

            seen = true;
            if let Some(token) = parse_bearer(value) {
                return Lookup::Found(token);
            }
        }

        if seen { Lookup::Malformed } else { Lookup::Absent }
    }
}
