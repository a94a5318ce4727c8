//! Notification payloads.
//!
//! Any `Serialize` value can be sent; these types cover the documented
//! `aps` keys so callers do not have to build JSON by hand.

pub mod types;

pub use types::{Alert, Aps, InterruptionLevel, Payload};
