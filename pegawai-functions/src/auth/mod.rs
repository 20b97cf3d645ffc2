//! Caller authentication and authorization
//!
//! - [`Caller`] - extractor yielding the verified caller, if any
//! - [`require_admin`] - gate in front of every mutating operation
//! - [`TokenVerifier`] - pluggable source of caller identities

pub mod caller;
pub mod firebase;
pub mod verifier;

pub use caller::{Caller, CallerIdentity, require_admin};
pub use firebase::FirebaseIdTokenVerifier;
pub use verifier::{EmulatorTokenVerifier, SharedSecretVerifier, TokenVerifier};
