//! Typed header options for APNs requests.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use uuid::Uuid;

use crate::error::{ApnsError, ApnsResult};

pub const APNS_TOPIC: &str = "apns-topic";
pub const APNS_ID: &str = "apns-id";
pub const APNS_EXPIRATION: &str = "apns-expiration";
pub const APNS_PRIORITY: &str = "apns-priority";
pub const APNS_COLLAPSE_ID: &str = "apns-collapse-id";
pub const APNS_PUSH_TYPE: &str = "apns-push-type";

/// Collapse identifiers longer than this are rejected by APNs.
pub const MAX_COLLAPSE_ID_BYTES: usize = 64;

/// A named "set header" mutation.
///
/// Applying an option twice leaves the same header map, so options can be
/// replayed for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOption {
    name: HeaderName,
    value: HeaderValue,
}

/// Delivery priority (`apns-priority`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Send immediately (10).
    Immediate,
    /// Send with power considerations in mind (5).
    PowerConsiderate,
    /// Prioritise the device's power over everything else (1).
    Low,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        match self {
            Priority::Immediate => 10,
            Priority::PowerConsiderate => 5,
            Priority::Low => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            10 => Some(Priority::Immediate),
            5 => Some(Priority::PowerConsiderate),
            1 => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Payload kind (`apns-push-type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushType {
    Alert,
    Background,
    Location,
    Voip,
    Complication,
    FileProvider,
    Mdm,
    LiveActivity,
    PushToTalk,
}

impl PushType {
    pub fn as_str(self) -> &'static str {
        match self {
            PushType::Alert => "alert",
            PushType::Background => "background",
            PushType::Location => "location",
            PushType::Voip => "voip",
            PushType::Complication => "complication",
            PushType::FileProvider => "fileprovider",
            PushType::Mdm => "mdm",
            PushType::LiveActivity => "liveactivity",
            PushType::PushToTalk => "pushtotalk",
        }
    }
}

impl std::str::FromStr for PushType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alert" => Ok(PushType::Alert),
            "background" => Ok(PushType::Background),
            "location" => Ok(PushType::Location),
            "voip" => Ok(PushType::Voip),
            "complication" => Ok(PushType::Complication),
            "fileprovider" => Ok(PushType::FileProvider),
            "mdm" => Ok(PushType::Mdm),
            "liveactivity" => Ok(PushType::LiveActivity),
            "pushtotalk" => Ok(PushType::PushToTalk),
            other => Err(format!("unknown push type '{}'", other)),
        }
    }
}

impl fmt::Display for PushType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HeaderOption {
    fn from_static_name(name: &'static str, value: HeaderValue) -> Self {
        Self {
            name: HeaderName::from_static(name),
            value,
        }
    }

    fn text(name: &'static str, value: &str) -> ApnsResult<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| ApnsError::InvalidHeader {
            name,
            message: e.to_string(),
        })?;
        Ok(Self::from_static_name(name, value))
    }

    /// `authorization: bearer <token>`.
    pub fn bearer(token: &str) -> ApnsResult<Self> {
        let mut value =
            HeaderValue::from_str(&format!("bearer {}", token)).map_err(|e| ApnsError::InvalidHeader {
                name: "authorization",
                message: e.to_string(),
            })?;
        value.set_sensitive(true);
        Ok(Self {
            name: AUTHORIZATION,
            value,
        })
    }

    /// `apns-topic`, usually the app's bundle ID.
    pub fn topic(topic: &str) -> ApnsResult<Self> {
        if topic.is_empty() {
            return Err(ApnsError::InvalidHeader {
                name: APNS_TOPIC,
                message: "topic must not be empty".to_string(),
            });
        }
        Self::text(APNS_TOPIC, topic)
    }

    /// `apns-id`, the canonical UUID identifying the notification.
    pub fn notification_id(id: Uuid) -> ApnsResult<Self> {
        Self::text(APNS_ID, &id.hyphenated().to_string())
    }

    /// `apns-id` with a freshly generated UUID.
    pub fn random_notification_id() -> ApnsResult<Self> {
        Self::notification_id(Uuid::new_v4())
    }

    /// `apns-expiration` as unix seconds; 0 means "deliver once or drop".
    pub fn expiration(unix_secs: u64) -> Self {
        Self::from_static_name(APNS_EXPIRATION, HeaderValue::from(unix_secs))
    }

    pub fn priority(priority: Priority) -> Self {
        Self::from_static_name(APNS_PRIORITY, HeaderValue::from(u16::from(priority.as_u8())))
    }

    /// `apns-collapse-id`, at most 64 bytes.
    pub fn collapse_id(id: &str) -> ApnsResult<Self> {
        if id.len() > MAX_COLLAPSE_ID_BYTES {
            return Err(ApnsError::InvalidHeader {
                name: APNS_COLLAPSE_ID,
                message: format!("{} bytes exceeds {}", id.len(), MAX_COLLAPSE_ID_BYTES),
            });
        }
        Self::text(APNS_COLLAPSE_ID, id)
    }

    pub fn push_type(push_type: PushType) -> Self {
        Self::from_static_name(APNS_PUSH_TYPE, HeaderValue::from_static(push_type.as_str()))
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }

    /// Set the header, replacing any existing value.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }
}
