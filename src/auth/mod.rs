//! Provider token authentication.
//!
//! # Data Flow
//! ```text
//! PEM key (config / file / APNS_PRIVATE_KEY)
//!     → signer.rs (ES256 JWT: kid, iss, iat)
//!     → renewal.rs CredentialManager (publish "authorization: bearer ...")
//!     → HeaderRegistry
//!
//! Every renewal interval:
//!     renewal task → CredentialManager::refresh()
//!
//! On ExpiredProviderToken:
//!     send engine → CredentialManager::refresh() → retry once
//! ```
//!
//! # Security Constraints
//! - Never log private keys or tokens
//! - Signing failures are configuration errors and never retried

pub mod renewal;
pub mod signer;
pub mod types;

pub use renewal::{spawn_renewal, CredentialManager, RenewalHandle};
pub use signer::TokenSigner;
pub use types::{Credential, CredentialError, CredentialResult};
