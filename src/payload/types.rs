//! Notification body types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete notification body: the `aps` dictionary plus custom keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub aps: Aps,

    /// App-specific keys placed next to `aps`. Never holds `aps` itself.
    #[serde(flatten)]
    custom: Map<String, Value>,
}

impl Payload {
    pub fn new(aps: Aps) -> Self {
        Self {
            aps,
            custom: Map::new(),
        }
    }

    /// An alert with a title and body.
    pub fn alert(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Aps {
            alert: Some(Alert {
                title: Some(title.into()),
                body: Some(body.into()),
                ..Alert::default()
            }),
            ..Aps::default()
        })
    }

    /// A silent background update.
    pub fn background() -> Self {
        Self::new(Aps {
            content_available: Some(1),
            ..Aps::default()
        })
    }

    /// Add a custom top-level key. `aps` is reserved and ignored.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "aps" {
            self.custom.insert(key, value.into());
        }
        self
    }

    pub fn custom(&self) -> &Map<String, Value> {
        &self.custom
    }
}

/// Apple's reserved `aps` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,

    /// Number shown on the app icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,

    /// Groups notifications in Notification Center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// 1 wakes the app in the background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_available: Option<u8>,

    /// 1 routes through the notification service extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_content_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption_level: Option<InterruptionLevel>,

    /// Between 0 and 1; highest scores are featured in the summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<String>,

    /// Unix time at which a Live Activity becomes stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_date: Option<u64>,

    /// Updated Live Activity content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_state: Option<Map<String, Value>>,

    /// Unix time of a Live Activity update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    /// `update` or `end` for Live Activities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptionLevel {
    Passive,
    Active,
    TimeSensitive,
    Critical,
}

/// The `alert` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_loc_key: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitle_loc_args: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_key: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loc_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_payload_shape() {
        let payload = Payload::alert("hi", "world").with_custom("order_id", 42);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "aps": { "alert": { "title": "hi", "body": "world" } },
                "order_id": 42
            })
        );
    }

    #[test]
    fn test_kebab_case_keys() {
        let payload = Payload::new(Aps {
            thread_id: Some("chat-1".into()),
            mutable_content: Some(1),
            interruption_level: Some(InterruptionLevel::TimeSensitive),
            alert: Some(Alert {
                loc_key: Some("GREETING".into()),
                loc_args: vec!["Ana".into()],
                ..Alert::default()
            }),
            ..Aps::default()
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["aps"]["thread-id"], "chat-1");
        assert_eq!(value["aps"]["mutable-content"], 1);
        assert_eq!(value["aps"]["interruption-level"], "time-sensitive");
        assert_eq!(value["aps"]["alert"]["loc-key"], "GREETING");
        assert_eq!(value["aps"]["alert"]["loc-args"], json!(["Ana"]));
    }

    #[test]
    fn test_background_payload() {
        let body = serde_json::to_string(&Payload::background()).unwrap();
        assert_eq!(body, r#"{"aps":{"content-available":1}}"#);
    }

    #[test]
    fn test_custom_cannot_shadow_aps() {
        let payload = Payload::background().with_custom("aps", "oops");
        assert!(payload.custom().is_empty());

        let body = serde_json::to_string(&payload).unwrap();
        assert_eq!(body.matches("\"aps\"").count(), 1);
    }

    #[test]
    fn test_deserialize_keeps_aps_out_of_custom() {
        let payload: Payload =
            serde_json::from_str(r#"{"aps":{"badge":3},"order_id":7}"#).unwrap();
        assert_eq!(payload.aps.badge, Some(3));
        assert_eq!(payload.custom().len(), 1);
        assert_eq!(payload.custom()["order_id"], 7);
    }
}
