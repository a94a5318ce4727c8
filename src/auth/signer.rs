//! Provider token signing.
//!
//! # Security
//! - Key material is read from config, a file, or `APNS_PRIVATE_KEY`
//! - Keys and tokens are never logged

use std::path::Path;
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::auth::types::{unix_now, Credential, CredentialError, CredentialResult};

/// Environment variable holding the PEM encoded signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "APNS_PRIVATE_KEY";

#[derive(Serialize)]
struct ProviderClaims<'a> {
    iss: &'a str,
    iat: u64,
}

/// Issues ES256 provider tokens for one key.
#[derive(Clone)]
pub struct TokenSigner {
    key: EncodingKey,
    key_id: String,
    team_id: String,
    validity: Duration,
}

impl TokenSigner {
    /// Create a signer from a PKCS#8 PEM encoded P-256 private key.
    pub fn from_pem(
        pem: &[u8],
        key_id: impl Into<String>,
        team_id: impl Into<String>,
        validity: Duration,
    ) -> CredentialResult<Self> {
        let key = EncodingKey::from_ec_pem(pem)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;

        Ok(Self {
            key,
            key_id: key_id.into(),
            team_id: team_id.into(),
            validity: validity.max(Duration::from_secs(1)),
        })
    }

    /// Create a signer from a `.p8` key file.
    pub fn from_file(
        path: &Path,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
        validity: Duration,
    ) -> CredentialResult<Self> {
        let pem = std::fs::read(path).map_err(|source| CredentialError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_pem(&pem, key_id, team_id, validity)
    }

    /// Create a signer from the `APNS_PRIVATE_KEY` environment variable.
    pub fn from_env(
        key_id: impl Into<String>,
        team_id: impl Into<String>,
        validity: Duration,
    ) -> CredentialResult<Self> {
        let pem = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            CredentialError::MissingKey(format!("environment variable {} not set", PRIVATE_KEY_ENV_VAR))
        })?;
        Self::from_pem(pem.as_bytes(), key_id, team_id, validity)
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a token issued now.
    pub fn issue(&self) -> CredentialResult<Credential> {
        self.issue_at(unix_now())
    }

    /// Sign a token issued at `issued_at` (unix seconds).
    pub fn issue_at(&self, issued_at: u64) -> CredentialResult<Credential> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        let claims = ProviderClaims {
            iss: &self.team_id,
            iat: issued_at,
        };

        let token = jsonwebtoken::encode(&header, &claims, &self.key)
            .map_err(|e| CredentialError::Signing(e.to_string()))?;

        Ok(Credential::new(
            self.key_id.clone(),
            self.team_id.clone(),
            issued_at,
            issued_at + self.validity.as_secs(),
            token,
        ))
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key_id", &self.key_id)
            .field("team_id", &self.team_id)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}
