use std::fmt;

use serde::Deserialize;

/// Bearer token handed out by a remote auth endpoint.
///
/// Tokens live for a single operation; nothing caches or refreshes them.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Returns `None` for an empty token, which the remote system may send
    /// alongside a 200.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Body of a successful authentication reply
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    pub fn into_token(self) -> Option<AuthToken> {
        self.token.and_then(AuthToken::new)
    }
}
