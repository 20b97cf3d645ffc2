//! Identity service seam
//!
//! The identity service owns accounts, credentials, and role claims. This
//! service only issues writes against it.

pub mod firebase;

pub use firebase::FirebaseAuthClient;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{PegawaiUpdate, Role};

use crate::error::RemoteError;

/// Partial account update; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl IdentityUpdate {
    /// Only the fields the request actually supplies
    pub fn from_request(req: &PegawaiUpdate) -> Self {
        Self {
            email: req.email().map(String::from),
            password: req.password().map(String::from),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an account; returns the identifier the service assigned
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, RemoteError>;

    /// Replace the account's custom claims with `{role}`
    async fn set_role_claim(&self, id: &str, role: Role) -> Result<(), RemoteError>;

    async fn update_account(&self, id: &str, update: &IdentityUpdate) -> Result<(), RemoteError>;

    /// Permanently remove the account
    async fn delete_account(&self, id: &str) -> Result<(), RemoteError>;
}
