//! Document identity tokens for discarding stale asynchronous results.

use std::fmt;

use uuid::Uuid;

/// Identity of one loaded source document.
///
/// A fresh token is minted every time a document is loaded. Work started
/// under one token (a reconciliation, an OCR run) must be dropped on
/// completion if the session's current token has changed in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Mint a new, unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
