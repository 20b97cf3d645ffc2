//! Pegawai (employee) account models
//!
//! Request types accept both the English field names and the Indonesian
//! names used by the existing mobile client (`nama`, `organisasi`,
//! `kodeOrganisasi`, `uid`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role stored as a custom claim on the identity record and in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Pegawai,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pegawai => "pegawai",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create pegawai payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegawaiCreate {
    #[serde(alias = "nama")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(alias = "organisasi")]
    pub organization: String,
    #[serde(alias = "kodeOrganisasi")]
    pub organization_code: String,
}

/// Update pegawai payload
///
/// Absent and empty fields both mean "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegawaiUpdate {
    #[serde(alias = "uid")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl PegawaiUpdate {
    /// Supplied new email, if any
    pub fn email(&self) -> Option<&str> {
        self.new_email.as_deref().filter(|s| !s.is_empty())
    }

    /// Supplied new password, if any
    pub fn password(&self) -> Option<&str> {
        self.new_password.as_deref().filter(|s| !s.is_empty())
    }
}

/// Delete pegawai payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PegawaiDelete {
    #[serde(alias = "uid")]
    pub id: String,
}

/// Acknowledgement returned by create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegawaiCreated {
    pub success: bool,
    /// Identifier assigned by the identity service
    pub id: String,
}

/// Acknowledgement returned by update and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
}

/// Profile document stored under the account id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegawaiProfile {
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "organisasi")]
    pub organization: String,
    #[serde(rename = "kodeOrganisasi")]
    pub organization_code: String,
}

impl PegawaiProfile {
    /// Profile for a freshly created pegawai account
    pub fn from_create(req: &PegawaiCreate) -> Self {
        Self {
            name: req.name.clone(),
            email: req.email.clone(),
            role: Role::Pegawai,
            organization: req.organization.clone(),
            organization_code: req.organization_code.clone(),
        }
    }

    /// Stored field names paired with their string values
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("nama", self.name.as_str()),
            ("email", self.email.as_str()),
            ("role", self.role.as_str()),
            ("organisasi", self.organization.as_str()),
            ("kodeOrganisasi", self.organization_code.as_str()),
        ]
    }
}
