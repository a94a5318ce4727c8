//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Client, renewal task, CLI produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Whatever metrics recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder on its own
//! - Tokens and keys never appear in log fields

pub mod logging;
pub mod metrics;
