//! Caller identity extraction and the admin gate

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::Role;
use std::convert::Infallible;

use crate::error::ServiceError;
use crate::state::AppState;

/// Authenticated principal behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub uid: String,
    pub email: Option<String>,
    /// Custom role claim, if the token carries one
    pub role: Option<String>,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(Role::Admin.as_str())
    }
}

/// Optional caller of a callable request
///
/// Missing, malformed, or unverifiable tokens all yield `Caller(None)`;
/// the admin gate then refuses the request like any other non-admin.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Ok(Caller(None));
        };

        match state.verifier.verify(token).await {
            Ok(identity) => {
                tracing::debug!(
                    uid = %identity.uid,
                    email = identity.email.as_deref().unwrap_or("-"),
                    role = identity.role.as_deref().unwrap_or("-"),
                    "Caller verified"
                );
                Ok(Caller(Some(identity)))
            }
            Err(e) => {
                tracing::warn!(error = %e, uri = %parts.uri, "Caller token rejected");
                Ok(Caller(None))
            }
        }
    }
}

/// Permit only admin callers
pub fn require_admin(caller: Option<&CallerIdentity>) -> Result<&CallerIdentity, ServiceError> {
    match caller {
        Some(identity) if identity.is_admin() => Ok(identity),
        Some(identity) => {
            tracing::warn!(
                uid = %identity.uid,
                role = identity.role.as_deref().unwrap_or("-"),
                "Admin role required"
            );
            Err(ServiceError::PermissionDenied)
        }
        None => {
            tracing::warn!("Unauthenticated call to admin operation");
            Err(ServiceError::PermissionDenied)
        }
    }
}
