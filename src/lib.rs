//! Apple Push Notification service provider client.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ── send(device_token, payload, options) ──▶ client
//!                                                       │
//!              ┌────────────────────────────────────────┤
//!              ▼                                        ▼
//!        headers::HeaderRegistry  ◀── publish ──  auth::CredentialManager
//!        (apns-topic, authorization)                    ▲
//!              │                                        │ every interval
//!              ▼                                  auth::renewal task
//!        reqwest (HTTP/2, TLS) ──▶ APNs
//!              │
//!              ▼
//!        response::decode ──▶ Response | ApnsError (classified)
//!
//!   Cross-cutting: config, observability, resilience (retry + backoff)
//! ```

// Core
pub mod auth;
pub mod client;
pub mod headers;
pub mod payload;
pub mod response;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApnsError, ApnsResult};
pub use headers::{HeaderOption, Priority, PushType};
pub use payload::Payload;
pub use response::{Classification, Reason, Response};
