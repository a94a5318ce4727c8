//! Response decoding and the APNs failure taxonomy.
//!
//! # Data Flow
//! ```text
//! HTTP status + headers + body
//!     → decode.rs (parse {"reason", "timestamp"})
//!     → reason.rs (wire code → Reason → Classification)
//!     → Response / ApnsError::Rejected
//! ```
//!
//! # Design Decisions
//! - The reason table is a `match`, built at compile time
//! - Unknown codes are kept verbatim instead of failing
//! - Malformed bodies are decode failures, never "unknown reason"

pub mod decode;
pub mod reason;

pub use decode::{decode, Response};
pub use reason::{Classification, Reason};
