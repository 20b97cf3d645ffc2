//! Service-layer error types for pegawai-functions
//!
//! `ServiceError` is what the coordination service returns. It keeps the
//! failed stage, how far the two-system write got, and the remote cause, and
//! is translated into the caller-facing `AppError` per operation.

use shared::error::AppError;
use std::fmt;

use crate::pegawai::Operation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote system a call was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteService {
    Identity,
    DocumentStore,
    TokenEndpoint,
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemoteService::Identity => "identity service",
            RemoteService::DocumentStore => "document store",
            RemoteService::TokenEndpoint => "token endpoint",
        })
    }
}

/// Failure of a call to a remote collaborator
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: RemoteService,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}: {message}")]
    Status {
        service: RemoteService,
        status: u16,
        message: String,
    },
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: RemoteService,
        message: String,
    },
    #[error("access token unavailable: {0}")]
    Credentials(String),
}

impl RemoteError {
    pub fn status(service: RemoteService, status: u16, message: impl Into<String>) -> Self {
        RemoteError::Status {
            service,
            status,
            message: message.into(),
        }
    }

    pub fn decode(service: RemoteService, message: impl fmt::Display) -> Self {
        RemoteError::Decode {
            service,
            message: message.to_string(),
        }
    }
}

/// Remote call within an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    IdentityCreate,
    RoleClaim,
    IdentityUpdate,
    IdentityDelete,
    ProfilePut,
    ProfileUpdate,
    ProfileDelete,
}

impl WriteStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            WriteStage::IdentityCreate => "identity_create",
            WriteStage::RoleClaim => "role_claim",
            WriteStage::IdentityUpdate => "identity_update",
            WriteStage::IdentityDelete => "identity_delete",
            WriteStage::ProfilePut => "profile_put",
            WriteStage::ProfileUpdate => "profile_update",
            WriteStage::ProfileDelete => "profile_delete",
        }
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far the identity/profile pair got before an operation stopped
///
/// `IdentityCommitted` is the inconsistency window: the identity service
/// holds the new state while the profile store does not. Nothing rolls it
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Nothing,
    IdentityCommitted,
    ProfileCommitted,
}

impl CommitState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommitState::Nothing => "nothing",
            CommitState::IdentityCommitted => "identity_committed",
            CommitState::ProfileCommitted => "profile_committed",
        }
    }

    /// Identity and profile records may now disagree
    pub const fn is_divergent(&self) -> bool {
        matches!(self, CommitState::IdentityCommitted)
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-layer error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller is absent or not an admin. No remote call was made.
    #[error("caller is not an admin")]
    PermissionDenied,
    /// Request data does not fit the operation's request type
    #[error("request data rejected: {0}")]
    InvalidData(#[source] serde_json::Error),
    /// A remote call failed
    #[error("{stage} failed ({committed}): {source}")]
    Remote {
        stage: WriteStage,
        committed: CommitState,
        #[source]
        source: RemoteError,
    },
}

impl ServiceError {
    /// Caller-facing error for `op`
    pub fn into_app_error(self, op: Operation) -> AppError {
        let committed = self.commit_state();
        match self {
            ServiceError::PermissionDenied => AppError::permission_denied(op.denied_message()),
            ServiceError::InvalidData(e) => AppError::internal(op.failure_message())
                .with_detail("stage", "decode")
                .with_detail("cause", e.to_string()),
            ServiceError::Remote { stage, source, .. } => AppError::internal(op.failure_message())
                .with_detail("stage", stage.as_str())
                .with_detail("commit_state", committed.as_str())
                .with_detail("cause", source.to_string()),
        }
    }

    /// Commit state at the point of failure
    pub fn commit_state(&self) -> CommitState {
        match self {
            ServiceError::Remote { committed, .. } => *committed,
            _ => CommitState::Nothing,
        }
    }
}
