//! Credential publication and periodic renewal.
//!
//! # Responsibilities
//! - Issue a fresh token and publish it into the header registry
//! - Re-issue on a fixed interval from a background task
//! - Stop promptly when the owning client goes away

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::auth::signer::TokenSigner;
use crate::auth::types::{Credential, CredentialError, CredentialResult};
use crate::headers::{HeaderOption, HeaderRegistry};
use crate::observability::metrics;

/// Issues credentials and publishes them as the `authorization` option.
#[derive(Debug)]
pub struct CredentialManager {
    signer: TokenSigner,
    registry: Arc<HeaderRegistry>,
    issued: AtomicU64,
    /// Serializes publication so racing renewals sign once.
    publishing: Mutex<()>,
}

impl CredentialManager {
    pub fn new(signer: TokenSigner, registry: Arc<HeaderRegistry>) -> Self {
        Self {
            signer,
            registry,
            issued: AtomicU64::new(0),
            publishing: Mutex::new(()),
        }
    }

    /// Issue a new credential and replace the registered bearer token.
    pub fn refresh(&self) -> CredentialResult<Credential> {
        let _guard = self.publishing.lock();
        self.publish()
    }

    /// Replace the published `authorization` value if it is still `stale`.
    ///
    /// When another caller has already published a newer token, that token
    /// is returned and nothing is signed.
    pub fn renew_stale(&self, stale: Option<&HeaderValue>) -> CredentialResult<HeaderValue> {
        let _guard = self.publishing.lock();
        if let Some(current) = self.registry.get(AUTHORIZATION.as_str()) {
            if stale != Some(&current) {
                return Ok(current);
            }
        }

        let credential = self.publish()?;
        let value = HeaderOption::bearer(credential.token()).map_err(|_| CredentialError::InvalidToken)?;
        Ok(value.value().clone())
    }

    fn publish(&self) -> CredentialResult<Credential> {
        let credential = self.signer.issue()?;
        let option =
            HeaderOption::bearer(credential.token()).map_err(|_| CredentialError::InvalidToken)?;
        self.registry.register(option);
        self.issued.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            key_id = %credential.key_id,
            expires_at = credential.expires_at,
            "Provider token published"
        );
        Ok(credential)
    }

    /// Number of credentials issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

}

/// Owns the renewal task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct RenewalHandle {
    shutdown: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl RenewalHandle {
    /// Signal the task to stop without waiting for it.
    pub fn trigger(&self) {
        let _ = self.shutdown.send(());
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.trigger();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Credential renewal task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for RenewalHandle {
    fn drop(&mut self) {
        self.trigger();
    }
}

/// Spawn the renewal loop on the current tokio runtime.
///
/// The first renewal happens one `interval` after spawning; the caller is
/// expected to have published an initial credential already.
pub fn spawn_renewal(manager: Arc<CredentialManager>, interval: Duration) -> RenewalHandle {
    let (shutdown, rx) = broadcast::channel(1);
    let task = tokio::spawn(run(manager, interval, rx));
    RenewalHandle {
        shutdown,
        task: Some(task),
    }
}

async fn run(manager: Arc<CredentialManager>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
    tracing::info!(interval_secs = interval.as_secs(), "Credential renewal starting");

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match manager.refresh() {
                    Ok(_) => metrics::record_token_renewal(true),
                    Err(e) => {
                        metrics::record_token_renewal(false);
                        tracing::warn!(error = %e, "Credential renewal failed, retrying next tick");
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Credential renewal received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
