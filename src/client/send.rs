//! Request assembly, execution and outcome classification.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::Client;
use crate::error::{ApnsError, ApnsResult};
use crate::headers::HeaderOption;
use crate::observability::metrics;
use crate::resilience::retry_with_backoff;
use crate::response::{decode, Reason, Response};

/// A fully assembled request that can be executed more than once.
#[derive(Debug, Clone)]
struct PreparedRequest {
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Client {
    /// Deliver one notification.
    ///
    /// Header options passed here override registered options of the same
    /// name for this request only.
    pub async fn send<P>(&self, device_token: &str, payload: &P, options: &[HeaderOption]) -> ApnsResult<Response>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(ApnsError::Encode)?;
        self.send_raw(device_token, body, options).await
    }

    /// Deliver a pre-serialized JSON body.
    pub async fn send_raw(&self, device_token: &str, body: Vec<u8>, options: &[HeaderOption]) -> ApnsResult<Response> {
        let request = self.prepare_request(device_token, body, options)?;
        self.dispatch(request).await
    }

    /// Deliver with bounded retries of connection and server failures.
    ///
    /// Each attempt rebuilds the request, so a token renewed between attempts
    /// is picked up.
    pub async fn send_with_retry<P>(
        &self,
        device_token: &str,
        payload: &P,
        options: &[HeaderOption],
    ) -> ApnsResult<Response>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(ApnsError::Encode)?;
        let policy = self.inner.retry.clone();

        retry_with_backoff(
            || {
                let client = self.clone();
                let device_token = device_token.to_string();
                let body = body.clone();
                let options = options.to_vec();
                async move { client.send_raw(&device_token, body, &options).await }
            },
            &policy,
        )
        .await
    }

    /// Deliver unless `cancel` fires first, in which case the in-flight
    /// request is dropped and [`ApnsError::Cancelled`] is returned.
    pub async fn send_until_cancelled<P>(
        &self,
        cancel: &CancellationToken,
        device_token: &str,
        payload: &P,
        options: &[HeaderOption],
    ) -> ApnsResult<Response>
    where
        P: Serialize + ?Sized,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Send cancelled by caller");
                Err(ApnsError::Cancelled)
            }
            result = self.send(device_token, payload, options) => result,
        }
    }

    fn prepare_request(&self, device_token: &str, body: Vec<u8>, options: &[HeaderOption]) -> ApnsResult<PreparedRequest> {
        if body.is_empty() {
            return Err(ApnsError::EmptyPayload);
        }
        let url = device_url(&self.inner.endpoint, device_token)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.inner.registry.apply(&mut headers);
        for option in options {
            option.apply(&mut headers);
        }

        Ok(PreparedRequest { url, headers, body })
    }

    /// Execute once, refreshing the provider token and re-executing exactly
    /// once more if the token was reported expired.
    async fn dispatch(&self, mut request: PreparedRequest) -> ApnsResult<Response> {
        let first = self.execute(&request).await;

        let expired = matches!(&first, Err(e) if e.reason() == Some(&Reason::ExpiredProviderToken));
        let Some(credentials) = self.credentials().filter(|_| expired) else {
            return first;
        };

        tracing::warn!("Provider token expired, renewing and retrying once");
        let renewed = credentials.renew_stale(request.headers.get(AUTHORIZATION))?;
        request.headers.insert(AUTHORIZATION, renewed);

        self.execute(&request).await
    }

    async fn execute(&self, request: &PreparedRequest) -> ApnsResult<Response> {
        let start = Instant::now();
        let result = self.round_trip(request).await;
        metrics::record_request(outcome_label(&result), start);

        match &result {
            Ok(response) => tracing::debug!(
                url = %request.url,
                status = response.status,
                apns_id = response.notification_id.as_deref().unwrap_or(""),
                "Notification accepted"
            ),
            Err(e) => tracing::debug!(url = %request.url, error = %e, "Notification failed"),
        }
        result
    }

    async fn round_trip(&self, request: &PreparedRequest) -> ApnsResult<Response> {
        let response = self
            .inner
            .http
            .post(request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| ApnsError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Response::from_headers(status, response.headers()));
        }
        if status.is_server_error() {
            return Err(ApnsError::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("server error").to_string(),
            });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApnsError::Connection(e.to_string()))?;

        // Any non-success status is a rejection, even without a reason.
        Err(ApnsError::Rejected(Box::new(decode(status, &headers, &body)?)))
    }
}

/// `{endpoint}/3/device/{token}`, keeping any endpoint path prefix. The
/// token is always a single percent-encoded segment.
fn device_url(endpoint: &Url, device_token: &str) -> ApnsResult<Url> {
    if matches!(device_token, "" | "." | "..") {
        return Err(ApnsError::InvalidRequest(format!("invalid device token '{}'", device_token)));
    }

    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| ApnsError::InvalidRequest(format!("endpoint '{}' cannot carry a path", endpoint)))?
        .pop_if_empty()
        .extend(["3", "device", device_token]);
    Ok(url)
}

fn outcome_label(result: &ApnsResult<Response>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(ApnsError::Connection(_)) => "connection",
        Err(ApnsError::Server { .. }) => "server",
        Err(ApnsError::Decode { .. }) => "decode",
        Err(_) => "rejected",
    }
}
