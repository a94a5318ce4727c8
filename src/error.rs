//! Crate-level error type.

use thiserror::Error;

use crate::auth::CredentialError;
use crate::config::loader::ConfigError;
use crate::response::{Classification, Reason, Response};

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ApnsError {
    /// The transport did not complete (refused, reset, timed out).
    #[error("connection error: {0}")]
    Connection(String),

    /// APNs answered with a 5xx status. The body is not inspected.
    #[error("server error: {status} {message}")]
    Server { status: u16, message: String },

    /// APNs rejected the notification with a reason code.
    #[error("notification rejected: {}", rejection_message(.0))]
    Rejected(Box<Response>),

    /// The response body did not match the wire format.
    #[error("malformed response body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The payload could not be serialized.
    #[error("payload encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("payload is empty")]
    EmptyPayload,

    /// A header option was given a value that cannot be sent.
    #[error("invalid {name} header: {message}")]
    InvalidHeader { name: &'static str, message: String },

    /// The request URL could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The caller cancelled the send.
    #[error("send cancelled")]
    Cancelled,
}

/// Result type for client operations.
pub type ApnsResult<T> = Result<T, ApnsError>;

impl ApnsError {
    /// Tier of the failure, or `None` for local errors (decode, config,
    /// credential, cancellation).
    pub fn classification(&self) -> Option<Classification> {
        match self {
            ApnsError::Connection(_) => Some(Classification::Connection),
            ApnsError::Server { .. } => Some(Classification::Server),
            ApnsError::Rejected(response) => Some(
                response
                    .reason
                    .as_ref()
                    .map_or(Classification::Application, Reason::classification),
            ),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_temporary(&self) -> bool {
        self.classification().is_some_and(Classification::is_temporary)
    }

    /// The decoded reason for a rejection.
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            ApnsError::Rejected(response) => response.reason.as_ref(),
            _ => None,
        }
    }

    /// The decoded response for a rejection.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ApnsError::Rejected(response) => Some(response),
            _ => None,
        }
    }
}

fn rejection_message(response: &Response) -> String {
    match &response.reason {
        Some(reason) => reason.to_string(),
        None => format!("status {}", response.status),
    }
}
