//! APNs client.
//!
//! # Data Flow
//! ```text
//! ClientConfig
//!     → validate_config
//!     → reqwest transport (timeouts, pool, optional TLS identity)
//!     → HeaderRegistry seeded with apns-topic / authorization
//!     → CredentialManager + renewal task (token mode only)
//!
//! send(device_token, payload, options)
//!     → send.rs (build request, execute, classify, renew-once)
//!     → Response | ApnsError
//! ```
//!
//! # Design Decisions
//! - `Client` is a cheap clone over shared state; the last clone stops renewal
//! - Construction fails fast on bad keys, identities or config values

mod send;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use crate::auth::{spawn_renewal, CredentialManager, CredentialResult, RenewalHandle, TokenSigner};
use crate::config::{
    validate_config, AuthConfig, CertificateAuthConfig, ClientConfig, ConfigError, RetryConfig,
    TokenAuthConfig, TransportConfig, ValidationError,
};
use crate::error::ApnsResult;
use crate::headers::{HeaderOption, HeaderRegistry};

/// Client for the APNs provider API.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    registry: Arc<HeaderRegistry>,
    credentials: Option<Arc<CredentialManager>>,
    retry: RetryConfig,
    renewal: Mutex<Option<RenewalHandle>>,
}

impl Client {
    /// Build a client from a configuration.
    ///
    /// In token mode the first provider token is issued here, so a bad key
    /// fails construction. When renewal is enabled this must be called from
    /// within a tokio runtime.
    pub fn new(config: ClientConfig) -> ApnsResult<Self> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let endpoint = Url::parse(config.endpoint.resolve()).map_err(|e| {
            ConfigError::Validation(vec![ValidationError::InvalidEndpoint(e.to_string())])
        })?;

        let identity = match &config.auth {
            AuthConfig::Certificate(cert) => Some(load_identity(cert)?),
            _ => None,
        };
        let http = build_transport(&config.transport, identity)?;

        let registry = Arc::new(HeaderRegistry::new());
        if let Some(topic) = &config.topic {
            registry.register(HeaderOption::topic(topic)?);
        }

        let mut credentials = None;
        let mut renewal = None;
        match &config.auth {
            AuthConfig::None | AuthConfig::Certificate(_) => {}
            AuthConfig::Bearer { token } => registry.register(HeaderOption::bearer(token)?),
            AuthConfig::Token(token) => {
                let validity = Duration::from_secs(config.renewal.validity_secs);
                let manager = Arc::new(CredentialManager::new(
                    build_signer(token, validity)?,
                    registry.clone(),
                ));
                manager.refresh()?;

                if config.renewal.enabled {
                    tokio::runtime::Handle::try_current()
                        .map_err(|e| ConfigError::Runtime(e.to_string()))?;
                    renewal = Some(spawn_renewal(
                        manager.clone(),
                        Duration::from_secs(config.renewal.interval_secs),
                    ));
                }
                credentials = Some(manager);
            }
        }

        tracing::info!(
            endpoint = %endpoint,
            auth = auth_mode(&config.auth),
            renewal = renewal.is_some(),
            "APNs client initialized"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                registry,
                credentials,
                retry: config.retries,
                renewal: Mutex::new(renewal),
            }),
        })
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Header options applied to every request.
    pub fn registry(&self) -> &HeaderRegistry {
        &self.inner.registry
    }

    /// Install or replace a persistent header option.
    pub fn register_header(&self, option: HeaderOption) {
        self.inner.registry.register(option);
    }

    /// Provider tokens issued so far; zero unless token auth is configured.
    pub fn tokens_issued(&self) -> u64 {
        self.inner.credentials.as_ref().map_or(0, |c| c.issued())
    }

    /// Stop background renewal and wait for the task to exit.
    ///
    /// Sends keep working with the last published token until it expires;
    /// an `ExpiredProviderToken` rejection still triggers a one-off refresh.
    pub async fn stop_renewal(&self) {
        let handle = self.inner.renewal.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
            tracing::info!("Credential renewal stopped");
        }
    }

    pub(crate) fn credentials(&self) -> Option<&CredentialManager> {
        self.inner.credentials.as_deref()
    }
}

fn build_transport(
    config: &TransportConfig,
    identity: Option<reqwest::Identity>,
) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.max_idle_connections)
        .no_proxy();

    if let Some(identity) = identity {
        builder = builder.identity(identity);
    }

    builder.build().map_err(|e| ConfigError::Transport(e.to_string()))
}

fn load_identity(config: &CertificateAuthConfig) -> Result<reqwest::Identity, ConfigError> {
    let pem = match (&config.identity_pem, &config.identity_path) {
        (Some(pem), _) => pem.clone().into_bytes(),
        (None, Some(path)) => std::fs::read(path).map_err(|e| {
            ConfigError::Certificate(format!("failed to read '{}': {}", path.display(), e))
        })?,
        (None, None) => {
            return Err(ConfigError::Certificate("no identity configured".to_string()));
        }
    };

    reqwest::Identity::from_pem(&pem).map_err(|e| ConfigError::Certificate(e.to_string()))
}

/// Key sources in order: inline PEM, key file, `APNS_PRIVATE_KEY`.
fn build_signer(config: &TokenAuthConfig, validity: Duration) -> CredentialResult<TokenSigner> {
    let key_id = config.key_id.as_str();
    let team_id = config.team_id.as_str();

    if let Some(pem) = &config.private_key_pem {
        TokenSigner::from_pem(pem.as_bytes(), key_id, team_id, validity)
    } else if let Some(path) = &config.private_key_path {
        TokenSigner::from_file(path, key_id, team_id, validity)
    } else {
        TokenSigner::from_env(key_id, team_id, validity)
    }
}

fn auth_mode(auth: &AuthConfig) -> &'static str {
    match auth {
        AuthConfig::None => "none",
        AuthConfig::Token(_) => "token",
        AuthConfig::Bearer { .. } => "bearer",
        AuthConfig::Certificate(_) => "certificate",
    }
}
