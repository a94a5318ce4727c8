//! Header options applied to outgoing requests.
//!
//! # Data Flow
//! ```text
//! request assembly:
//!     registry.rs (persistent options, read lock)
//!     → per-call options (override by header name)
//!     → outgoing HeaderMap
//!
//! credential renewal / reconfiguration:
//!     → registry.rs register() (write lock, map update only)
//! ```

pub mod options;
pub mod registry;

pub use options::{HeaderOption, Priority, PushType};
pub use registry::HeaderRegistry;
