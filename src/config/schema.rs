//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Production APNs endpoint.
pub const PRODUCTION_ENDPOINT: &str = "https://api.push.apple.com";

/// Development (sandbox) APNs endpoint.
pub const SANDBOX_ENDPOINT: &str = "https://api.sandbox.push.apple.com";

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint URL, or one of the aliases `production` / `sandbox`.
    pub endpoint: Endpoint,

    /// Default `apns-topic` for every request (usually the bundle ID).
    pub topic: Option<String>,

    /// Authentication mode.
    pub auth: AuthConfig,

    /// HTTP transport settings.
    pub transport: TransportConfig,

    /// Provider token renewal.
    pub renewal: RenewalConfig,

    /// Retry configuration for `send_with_retry`.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Defaults pointed at a custom endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint(endpoint.into()),
            ..Self::default()
        }
    }
}

/// APNs base URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Endpoint(pub String);

impl Endpoint {
    pub fn production() -> Self {
        Self(PRODUCTION_ENDPOINT.to_string())
    }

    pub fn sandbox() -> Self {
        Self(SANDBOX_ENDPOINT.to_string())
    }

    /// The URL with aliases expanded and trailing slashes removed.
    pub fn resolve(&self) -> &str {
        match self.0.as_str() {
            "production" => PRODUCTION_ENDPOINT,
            "sandbox" | "development" => SANDBOX_ENDPOINT,
            other => other.trim_end_matches('/'),
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::production()
    }
}

/// Mutually exclusive authentication modes.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No client-side authentication header.
    #[default]
    None,

    /// Signed provider tokens, renewed in the background.
    Token(TokenAuthConfig),

    /// A pre-signed bearer token supplied by the caller.
    Bearer { token: String },

    /// TLS client certificate authentication.
    Certificate(CertificateAuthConfig),
}

/// Signing material for provider tokens.
///
/// The key is taken from `private_key_pem`, then `private_key_path`, then
/// the `APNS_PRIVATE_KEY` environment variable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenAuthConfig {
    /// 10-character key identifier from the developer account.
    pub key_id: String,

    /// Team identifier, used as the token issuer.
    pub team_id: String,

    /// Path to the `.p8` key file.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Inline PEM contents.
    #[serde(default, skip_serializing)]
    pub private_key_pem: Option<String>,
}

/// Client certificate identity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CertificateAuthConfig {
    /// PEM file containing the certificate chain and private key.
    #[serde(default)]
    pub identity_path: Option<PathBuf>,

    /// Inline PEM contents.
    #[serde(default, skip_serializing)]
    pub identity_pem: Option<String>,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum idle connections kept per host.
    pub max_idle_connections: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_idle_connections: 10,
        }
    }
}

/// Provider token renewal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenewalConfig {
    /// Run the background renewal task.
    pub enabled: bool,

    /// Seconds between renewals. Must be shorter than `validity_secs`.
    pub interval_secs: u64,

    /// Validity window of each token in seconds.
    pub validity_secs: u64,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 600,
            validity_secs: 3600,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
