//! Decoding of APNs responses into typed outcomes.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ApnsError;
use crate::response::reason::Reason;

/// Response header carrying the notification identifier.
pub const APNS_ID_HEADER: &str = "apns-id";

/// Response header carrying the sandbox-only unique identifier.
pub const APNS_UNIQUE_ID_HEADER: &str = "apns-unique-id";

/// The outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status returned by APNs.
    pub status: u16,
    /// Echoed or server-assigned `apns-id`.
    pub notification_id: Option<String>,
    /// `apns-unique-id`, only sent by the development environment.
    pub unique_id: Option<String>,
    /// Milliseconds since epoch at which APNs confirmed the token was no
    /// longer valid. Zero unless the body carried one.
    pub timestamp: i64,
    /// Failure reason, if the body named one.
    pub reason: Option<Reason>,
}

/// Wire shape of an APNs error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    timestamp: i64,
}

impl Response {
    /// Outcome for a status that carries no body worth reading.
    pub(crate) fn from_headers(status: StatusCode, headers: &HeaderMap) -> Self {
        Self {
            status: status.as_u16(),
            notification_id: header_string(headers, APNS_ID_HEADER),
            unique_id: header_string(headers, APNS_UNIQUE_ID_HEADER),
            timestamp: 0,
            reason: None,
        }
    }

    /// Whether the notification was accepted.
    pub fn is_success(&self) -> bool {
        self.reason.is_none() && (200..300).contains(&self.status)
    }

    /// Turn a response naming a failure reason into an error.
    pub fn into_result(self) -> Result<Response, ApnsError> {
        if self.reason.is_some() {
            Err(ApnsError::Rejected(Box::new(self)))
        } else {
            Ok(self)
        }
    }
}

/// Decode a response body and headers into a [`Response`].
///
/// An empty `reason` yields no failure. A body that is not valid JSON of the
/// expected shape is a [`ApnsError::Decode`], never an unknown reason.
pub fn decode(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Result<Response, ApnsError> {
    let raw: ErrorBody = serde_json::from_slice(body).map_err(|source| ApnsError::Decode {
        status: status.as_u16(),
        source,
    })?;

    let mut response = Response::from_headers(status, headers);
    response.timestamp = raw.timestamp;
    if !raw.reason.is_empty() {
        response.reason = Some(Reason::from_wire(&raw.reason));
    }
    Ok(response)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::reason::{Classification, KNOWN_REASONS};
    use reqwest::header::HeaderValue;

    const ID: &str = "123e4567-e89b-12d3-a456-426655440000";

    fn headers_with_id() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(APNS_ID_HEADER, HeaderValue::from_static(ID));
        headers
    }

    #[test]
    fn test_empty_reason_has_no_error() {
        let response = decode(StatusCode::OK, &headers_with_id(), br#"{"reason": ""}"#).unwrap();
        assert_eq!(response.notification_id.as_deref(), Some(ID));
        assert!(response.reason.is_none());
        assert_eq!(response.timestamp, 0);
        assert!(response.into_result().is_ok());
    }

    #[test]
    fn test_every_known_reason_decodes_with_its_classification() {
        for code in KNOWN_REASONS {
            let body = format!(r#"{{"reason": "{}"}}"#, code);
            let err = decode(StatusCode::BAD_REQUEST, &headers_with_id(), body.as_bytes())
                .unwrap()
                .into_result()
                .unwrap_err();

            let expected = Reason::from_wire(code).classification();
            assert_eq!(err.classification(), Some(expected), "{}", code);
            assert_eq!(err.reason().map(Reason::as_str), Some(code));
        }
    }

    #[test]
    fn test_unregistered_keeps_timestamp() {
        let body = br#"{"reason": "Unregistered", "timestamp": 1700000000123}"#;
        let response = decode(StatusCode::GONE, &HeaderMap::new(), body).unwrap();
        assert_eq!(response.reason, Some(Reason::Unregistered));
        assert_eq!(response.timestamp, 1_700_000_000_123);
        assert_eq!(response.status, 410);
        assert!(response.notification_id.is_none());
    }

    #[test]
    fn test_unknown_reason_is_generic_application_error() {
        let body = br#"{"reason": "SomethingNew"}"#;
        let err = decode(StatusCode::BAD_REQUEST, &HeaderMap::new(), body)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(err.classification(), Some(Classification::Application));
        assert_eq!(err.reason(), Some(&Reason::Unknown("SomethingNew".into())));
    }

    #[test]
    fn test_malformed_body_is_decode_failure() {
        let err = decode(StatusCode::BAD_REQUEST, &HeaderMap::new(), b"<html>nope</html>").unwrap_err();
        assert!(matches!(err, ApnsError::Decode { status: 400, .. }));
        assert_eq!(err.classification(), None);

        let err = decode(StatusCode::BAD_REQUEST, &HeaderMap::new(), b"").unwrap_err();
        assert!(matches!(err, ApnsError::Decode { .. }));
    }

    #[test]
    fn test_unique_id_is_read_when_present() {
        let mut headers = headers_with_id();
        headers.insert(APNS_UNIQUE_ID_HEADER, HeaderValue::from_static("a8f2e2b4"));
        let response = decode(StatusCode::OK, &headers, b"{}").unwrap();
        assert_eq!(response.unique_id.as_deref(), Some("a8f2e2b4"));
        assert!(response.is_success());
    }
}
