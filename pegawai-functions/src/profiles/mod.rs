//! Profile document store seam

pub mod firestore;

pub use firestore::FirestoreProfileStore;

use async_trait::async_trait;
use shared::models::PegawaiProfile;

use crate::error::RemoteError;

/// Stored field holding the account email
pub const EMAIL_FIELD: &str = "email";

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Create or fully overwrite the profile document of `id`
    async fn put_profile(&self, id: &str, profile: &PegawaiProfile) -> Result<(), RemoteError>;

    /// Set one string field of an existing document; fails if it is missing
    async fn update_profile_field(
        &self,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RemoteError>;

    /// Remove the document; removing a missing document succeeds
    async fn delete_profile(&self, id: &str) -> Result<(), RemoteError>;
}
