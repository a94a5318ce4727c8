//! Credential types and error definitions.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Errors raised while loading signing material or issuing tokens.
///
/// All of these are configuration problems and are never retried.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No signing key was supplied.
    #[error("missing signing key: {0}")]
    MissingKey(String),

    /// The key is not a PKCS#8 PEM encoded P-256 key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Key file could not be read.
    #[error("failed to read signing key {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The signature could not be produced.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The signed token cannot be carried in a header.
    #[error("token is not a valid header value")]
    InvalidToken,
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// A signed provider token with its validity window.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Key identifier (`kid`).
    pub key_id: String,
    /// Team identifier (`iss`).
    pub issuer: String,
    /// Issue time, unix seconds.
    pub issued_at: u64,
    /// End of the validity window, unix seconds.
    pub expires_at: u64,
    token: String,
}

impl Credential {
    pub(crate) fn new(key_id: String, issuer: String, issued_at: u64, expires_at: u64, token: String) -> Self {
        Self {
            key_id,
            issuer,
            issued_at,
            expires_at,
            token,
        }
    }

    /// The compact JWT.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the validity window has ended at `now` (unix seconds).
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
