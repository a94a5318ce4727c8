//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ClientConfig built in code
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → Client::new
//! ```
//!
//! # Design Decisions
//! - One plain value describes the whole client; no ordering-dependent builders
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, CertificateAuthConfig, ClientConfig, Endpoint, ObservabilityConfig, RenewalConfig,
    RetryConfig, TokenAuthConfig, TransportConfig, PRODUCTION_ENDPOINT, SANDBOX_ENDPOINT,
};
pub use validation::{validate_config, ValidationError};
