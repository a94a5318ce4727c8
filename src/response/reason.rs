//! Failure reasons reported by APNs in the `reason` key of an error body.

use std::fmt;

/// Which tier a failure belongs to. Decides retry eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The transport never completed the exchange.
    Connection,
    /// The service reported transient unavailability (5xx class).
    Server,
    /// The service deterministically rejected this request (4xx class).
    Application,
}

impl Classification {
    /// Connection and server failures are worth another attempt.
    pub fn is_temporary(self) -> bool {
        matches!(self, Classification::Connection | Classification::Server)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Classification::Connection => "connection",
            Classification::Server => "server",
            Classification::Application => "application",
        };
        f.write_str(name)
    }
}

/// A reason code returned by APNs.
///
/// Unrecognised codes are kept verbatim in [`Reason::Unknown`] so new
/// server-side codes do not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    BadCollapseId,
    BadDeviceToken,
    BadExpirationDate,
    BadMessageId,
    BadPriority,
    BadTopic,
    DeviceTokenNotForTopic,
    DuplicateHeaders,
    IdleTimeout,
    MissingDeviceToken,
    MissingTopic,
    PayloadEmpty,
    TopicDisallowed,
    BadCertificate,
    BadCertificateEnvironment,
    ExpiredProviderToken,
    Forbidden,
    InvalidProviderToken,
    MissingProviderToken,
    BadPath,
    MethodNotAllowed,
    Unregistered,
    PayloadTooLarge,
    TooManyProviderTokenUpdates,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    Shutdown,
    Unknown(String),
}

/// Every wire code the client recognises.
pub const KNOWN_REASONS: [&str; 28] = [
    "BadCollapseID",
    "BadDeviceToken",
    "BadExpirationDate",
    "BadMessageId",
    "BadPriority",
    "BadTopic",
    "DeviceTokenNotForTopic",
    "DuplicateHeaders",
    "IdleTimeout",
    "MissingDeviceToken",
    "MissingTopic",
    "PayloadEmpty",
    "TopicDisallowed",
    "BadCertificate",
    "BadCertificateEnvironment",
    "ExpiredProviderToken",
    "Forbidden",
    "InvalidProviderToken",
    "MissingProviderToken",
    "BadPath",
    "MethodNotAllowed",
    "Unregistered",
    "PayloadTooLarge",
    "TooManyProviderTokenUpdates",
    "TooManyRequests",
    "InternalServerError",
    "ServiceUnavailable",
    "Shutdown",
];

impl Reason {
    /// Map a wire code to a reason. Never fails.
    pub fn from_wire(code: &str) -> Self {
        match code {
            "BadCollapseID" => Reason::BadCollapseId,
            "BadDeviceToken" => Reason::BadDeviceToken,
            "BadExpirationDate" => Reason::BadExpirationDate,
            "BadMessageId" => Reason::BadMessageId,
            "BadPriority" => Reason::BadPriority,
            "BadTopic" => Reason::BadTopic,
            "DeviceTokenNotForTopic" => Reason::DeviceTokenNotForTopic,
            "DuplicateHeaders" => Reason::DuplicateHeaders,
            "IdleTimeout" => Reason::IdleTimeout,
            "MissingDeviceToken" => Reason::MissingDeviceToken,
            "MissingTopic" => Reason::MissingTopic,
            "PayloadEmpty" => Reason::PayloadEmpty,
            "TopicDisallowed" => Reason::TopicDisallowed,
            "BadCertificate" => Reason::BadCertificate,
            "BadCertificateEnvironment" => Reason::BadCertificateEnvironment,
            "ExpiredProviderToken" => Reason::ExpiredProviderToken,
            "Forbidden" => Reason::Forbidden,
            "InvalidProviderToken" => Reason::InvalidProviderToken,
            "MissingProviderToken" => Reason::MissingProviderToken,
            "BadPath" => Reason::BadPath,
            "MethodNotAllowed" => Reason::MethodNotAllowed,
            "Unregistered" => Reason::Unregistered,
            "PayloadTooLarge" => Reason::PayloadTooLarge,
            "TooManyProviderTokenUpdates" => Reason::TooManyProviderTokenUpdates,
            "TooManyRequests" => Reason::TooManyRequests,
            "InternalServerError" => Reason::InternalServerError,
            "ServiceUnavailable" => Reason::ServiceUnavailable,
            "Shutdown" => Reason::Shutdown,
            other => Reason::Unknown(other.to_string()),
        }
    }

    /// The code as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::BadCollapseId => "BadCollapseID",
            Reason::BadDeviceToken => "BadDeviceToken",
            Reason::BadExpirationDate => "BadExpirationDate",
            Reason::BadMessageId => "BadMessageId",
            Reason::BadPriority => "BadPriority",
            Reason::BadTopic => "BadTopic",
            Reason::DeviceTokenNotForTopic => "DeviceTokenNotForTopic",
            Reason::DuplicateHeaders => "DuplicateHeaders",
            Reason::IdleTimeout => "IdleTimeout",
            Reason::MissingDeviceToken => "MissingDeviceToken",
            Reason::MissingTopic => "MissingTopic",
            Reason::PayloadEmpty => "PayloadEmpty",
            Reason::TopicDisallowed => "TopicDisallowed",
            Reason::BadCertificate => "BadCertificate",
            Reason::BadCertificateEnvironment => "BadCertificateEnvironment",
            Reason::ExpiredProviderToken => "ExpiredProviderToken",
            Reason::Forbidden => "Forbidden",
            Reason::InvalidProviderToken => "InvalidProviderToken",
            Reason::MissingProviderToken => "MissingProviderToken",
            Reason::BadPath => "BadPath",
            Reason::MethodNotAllowed => "MethodNotAllowed",
            Reason::Unregistered => "Unregistered",
            Reason::PayloadTooLarge => "PayloadTooLarge",
            Reason::TooManyProviderTokenUpdates => "TooManyProviderTokenUpdates",
            Reason::TooManyRequests => "TooManyRequests",
            Reason::InternalServerError => "InternalServerError",
            Reason::ServiceUnavailable => "ServiceUnavailable",
            Reason::Shutdown => "Shutdown",
            Reason::Unknown(raw) => raw,
        }
    }

    /// Human-readable description of the failure.
    pub fn description(&self) -> &'static str {
        match self {
            Reason::BadCollapseId => "collapse identifier exceeds the maximum allowed size",
            Reason::BadDeviceToken => "specified device token was bad",
            Reason::BadExpirationDate => "apns-expiration value is bad",
            Reason::BadMessageId => "apns-id value is bad",
            Reason::BadPriority => "apns-priority value is bad",
            Reason::BadTopic => "apns-topic was invalid",
            Reason::DeviceTokenNotForTopic => "device token does not match the specified topic",
            Reason::DuplicateHeaders => "one or more headers were repeated",
            Reason::IdleTimeout => "idle time out",
            Reason::MissingDeviceToken => "device token is not specified in the request path",
            Reason::MissingTopic => "apns-topic header of the request was not specified and was required",
            Reason::PayloadEmpty => "message payload was empty",
            Reason::TopicDisallowed => "pushing to this topic is not allowed",
            Reason::BadCertificate => "certificate was bad",
            Reason::BadCertificateEnvironment => "client certificate was for the wrong environment",
            Reason::ExpiredProviderToken => "provider token is stale and a new token should be generated",
            Reason::Forbidden => "specified action is not allowed",
            Reason::InvalidProviderToken => {
                "provider token is not valid or the token signature could not be verified"
            }
            Reason::MissingProviderToken => {
                "no provider certificate was used to connect to APNs and Authorization header was missing"
            }
            Reason::BadPath => "request contained a bad :path value",
            Reason::MethodNotAllowed => "specified method was not POST",
            Reason::Unregistered => "device token is inactive for the specified topic",
            Reason::PayloadTooLarge => "message payload was too large",
            Reason::TooManyProviderTokenUpdates => "provider token is being updated too often",
            Reason::TooManyRequests => {
                "too many requests were made consecutively to the same device token"
            }
            Reason::InternalServerError => "an internal server error occurred",
            Reason::ServiceUnavailable => "service is unavailable",
            Reason::Shutdown => "the server is shutting down",
            Reason::Unknown(_) => "unknown reason",
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Reason::IdleTimeout => Classification::Connection,
            Reason::InternalServerError | Reason::ServiceUnavailable | Reason::Shutdown => {
                Classification::Server
            }
            _ => Classification::Application,
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.classification().is_temporary()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Unknown(raw) => write!(f, "unknown reason: {}", raw),
            known => write!(f, "{} ({})", known.description(), known.as_str()),
        }
    }
}
