//! Pegawai account administration
//!
//! Each operation runs the admin gate, then the identity write, then the
//! profile write, strictly in that order. The two writes are not atomic: a
//! profile failure after a committed identity write is reported and logged
//! as divergence, and nothing is rolled back.

use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{
    Ack, PegawaiCreate, PegawaiCreated, PegawaiDelete, PegawaiProfile, PegawaiUpdate, Role,
};
use std::sync::Arc;

use crate::auth::{CallerIdentity, require_admin};
use crate::error::{CommitState, RemoteError, ServiceError, WriteStage};
use crate::identity::{IdentityService, IdentityUpdate};
use crate::profiles::{EMAIL_FIELD, ProfileStore};

/// Callable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::Create => "createEmployee",
            Operation::Update => "updateEmployee",
            Operation::Delete => "deleteEmployee",
        }
    }

    pub const fn denied_message(&self) -> &'static str {
        match self {
            Operation::Create => "Hanya admin yang bisa membuat akun.",
            Operation::Update | Operation::Delete => "Akses ditolak.",
        }
    }

    pub const fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "Gagal membuat akun.",
            Operation::Update => "Gagal mengedit akun.",
            Operation::Delete => "Gagal menghapus akun.",
        }
    }
}

/// Commit progress of one operation on one account
struct Progress<'a> {
    op: Operation,
    /// Account id, or the requested email before an id exists
    account: &'a str,
    state: CommitState,
}

impl<'a> Progress<'a> {
    fn new(op: Operation, account: &'a str) -> Self {
        Self {
            op,
            account,
            state: CommitState::Nothing,
        }
    }

    fn commit(&mut self, state: CommitState) {
        self.state = state;
    }

    /// Turn a failed stage into a service error, logging divergence
    fn fail(&self, stage: WriteStage, source: RemoteError) -> ServiceError {
        if self.state.is_divergent() {
            tracing::error!(
                target: "pegawai::divergence",
                operation = self.op.name(),
                account = %self.account,
                stage = stage.as_str(),
                commit_state = self.state.as_str(),
                error = %source,
                "Identity record committed but profile record not written"
            );
        } else {
            tracing::warn!(
                operation = self.op.name(),
                account = %self.account,
                stage = stage.as_str(),
                error = %source,
                "Remote write failed"
            );
        }
        ServiceError::Remote {
            stage,
            committed: self.state,
            source,
        }
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ServiceError> {
    serde_json::from_value(data).map_err(ServiceError::InvalidData)
}

/// Coordinates identity and profile writes for pegawai accounts
pub struct PegawaiService {
    identity: Arc<dyn IdentityService>,
    profiles: Arc<dyn ProfileStore>,
}

impl PegawaiService {
    pub fn new(identity: Arc<dyn IdentityService>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    pub async fn create(
        &self,
        caller: Option<&CallerIdentity>,
        data: Value,
    ) -> Result<PegawaiCreated, ServiceError> {
        let admin = require_admin(caller)?;
        let req: PegawaiCreate = decode(data)?;
        self.create_pegawai(admin, &req).await
    }

    pub async fn update(
        &self,
        caller: Option<&CallerIdentity>,
        data: Value,
    ) -> Result<Ack, ServiceError> {
        let admin = require_admin(caller)?;
        let req: PegawaiUpdate = decode(data)?;
        self.update_pegawai(admin, &req).await
    }

    pub async fn delete(
        &self,
        caller: Option<&CallerIdentity>,
        data: Value,
    ) -> Result<Ack, ServiceError> {
        let admin = require_admin(caller)?;
        let req: PegawaiDelete = decode(data)?;
        self.delete_pegawai(admin, &req).await
    }

    async fn create_pegawai(
        &self,
        admin: &CallerIdentity,
        req: &PegawaiCreate,
    ) -> Result<PegawaiCreated, ServiceError> {
        let id = self
            .identity
            .create_account(&req.email, &req.password, &req.name)
            .await
            .map_err(|e| {
                Progress::new(Operation::Create, &req.email).fail(WriteStage::IdentityCreate, e)
            })?;

        let mut progress = Progress::new(Operation::Create, &id);
        progress.commit(CommitState::IdentityCommitted);

        // The claim must be in place before the profile exists
        self.identity
            .set_role_claim(&id, Role::Pegawai)
            .await
            .map_err(|e| progress.fail(WriteStage::RoleClaim, e))?;

        let profile = PegawaiProfile::from_create(req);
        self.profiles
            .put_profile(&id, &profile)
            .await
            .map_err(|e| progress.fail(WriteStage::ProfilePut, e))?;
        progress.commit(CommitState::ProfileCommitted);

        tracing::info!(
            admin = %admin.uid,
            id = %id,
            organization_code = %req.organization_code,
            "Pegawai account created"
        );
        Ok(PegawaiCreated { success: true, id })
    }

    async fn update_pegawai(
        &self,
        admin: &CallerIdentity,
        req: &PegawaiUpdate,
    ) -> Result<Ack, ServiceError> {
        let mut progress = Progress::new(Operation::Update, &req.id);
        let update = IdentityUpdate::from_request(req);
        if update.is_empty() {
            tracing::debug!(id = %req.id, "Update carries no changes");
        }

        self.identity
            .update_account(&req.id, &update)
            .await
            .map_err(|e| progress.fail(WriteStage::IdentityUpdate, e))?;
        progress.commit(CommitState::IdentityCommitted);

        // Password-only updates never touch the profile store
        if let Some(email) = req.email() {
            self.profiles
                .update_profile_field(&req.id, EMAIL_FIELD, email)
                .await
                .map_err(|e| progress.fail(WriteStage::ProfileUpdate, e))?;
            progress.commit(CommitState::ProfileCommitted);
        }

        tracing::info!(
            admin = %admin.uid,
            id = %req.id,
            email_changed = update.email.is_some(),
            password_changed = update.password.is_some(),
            "Pegawai account updated"
        );
        Ok(Ack::OK)
    }

    async fn delete_pegawai(
        &self,
        admin: &CallerIdentity,
        req: &PegawaiDelete,
    ) -> Result<Ack, ServiceError> {
        let mut progress = Progress::new(Operation::Delete, &req.id);

        self.identity
            .delete_account(&req.id)
            .await
            .map_err(|e| progress.fail(WriteStage::IdentityDelete, e))?;
        progress.commit(CommitState::IdentityCommitted);

        self.profiles
            .delete_profile(&req.id)
            .await
            .map_err(|e| progress.fail(WriteStage::ProfileDelete, e))?;
        progress.commit(CommitState::ProfileCommitted);

        tracing::info!(admin = %admin.uid, id = %req.id, "Pegawai account deleted");
        Ok(Ack::OK)
    }
}
