//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values and their relations.
//! Every problem is reported, not just the first one.

use thiserror::Error;

use crate::config::schema::{AuthConfig, ClientConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoint '{0}' is not a valid http(s) URL")]
    InvalidEndpoint(String),

    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("token auth requires a key_id")]
    EmptyKeyId,

    #[error("token auth requires a team_id")]
    EmptyTeamId,

    #[error("bearer auth requires a token")]
    EmptyBearerToken,

    #[error("certificate auth requires identity_path or identity_pem")]
    MissingIdentity,

    #[error("renewal interval ({interval_secs}s) must be shorter than token validity ({validity_secs}s)")]
    RenewalTooSlow { interval_secs: u64, validity_secs: u64 },

    #[error("renewal interval must be greater than zero")]
    ZeroRenewalInterval,

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffInverted { base: u64, max: u64 },

    #[error("transport.{0} must be greater than zero")]
    ZeroTransportSetting(&'static str),
}

/// Check a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = config.endpoint.resolve();
    match url::Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidEndpoint(endpoint.to_string())),
    }

    if matches!(config.topic.as_deref(), Some("")) {
        errors.push(ValidationError::EmptyTopic);
    }

    match &config.auth {
        AuthConfig::None => {}
        AuthConfig::Token(token) => {
            if token.key_id.is_empty() {
                errors.push(ValidationError::EmptyKeyId);
            }
            if token.team_id.is_empty() {
                errors.push(ValidationError::EmptyTeamId);
            }
            let renewal = &config.renewal;
            if renewal.interval_secs == 0 {
                errors.push(ValidationError::ZeroRenewalInterval);
            }
            if renewal.interval_secs >= renewal.validity_secs {
                errors.push(ValidationError::RenewalTooSlow {
                    interval_secs: renewal.interval_secs,
                    validity_secs: renewal.validity_secs,
                });
            }
        }
        AuthConfig::Bearer { token } => {
            if token.is_empty() {
                errors.push(ValidationError::EmptyBearerToken);
            }
        }
        AuthConfig::Certificate(cert) => {
            if cert.identity_path.is_none() && cert.identity_pem.is_none() {
                errors.push(ValidationError::MissingIdentity);
            }
        }
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::BackoffInverted {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }

    let transport = &config.transport;
    if transport.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTransportSetting("timeout_secs"));
    }
    if transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTransportSetting("connect_timeout_secs"));
    }
    if transport.max_idle_connections == 0 {
        errors.push(ValidationError::ZeroTransportSetting("max_idle_connections"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
