//! Caller token verification
//!
//! The caller's role lives in a claim of their ID token. Verifiers turn a
//! bearer token into a [`CallerIdentity`]; nothing is stored locally.

use async_trait::async_trait;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::CallerIdentity;

/// Token verification failure
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("no verification key for kid {0}")]
    UnknownKey(String),
    #[error("verification keys unavailable: {0}")]
    KeysUnavailable(String),
    #[error("token rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token has an empty subject")]
    EmptySubject,
}

/// Source of caller identities
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenError>;
}

/// Claims this service reads from an ID token
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Custom role claim
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<IdTokenClaims> for CallerIdentity {
    type Error = TokenError;

    fn try_from(claims: IdTokenClaims) -> Result<Self, Self::Error> {
        if claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(CallerIdentity {
            uid: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// HS256 verifier for local development
pub struct SharedSecretVerifier {
    key: DecodingKey,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[async_trait]
impl TokenVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenError> {
        let data =
            jsonwebtoken::decode::<IdTokenClaims>(token, &self.key, &Validation::new(Algorithm::HS256))?;
        CallerIdentity::try_from(data.claims)
    }
}

/// Verifier for tokens minted by the local auth emulator
///
/// Emulator tokens are unsigned, so only the payload is decoded.
pub struct EmulatorTokenVerifier;

#[async_trait]
impl TokenVerifier for EmulatorTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| TokenError::Malformed("missing payload segment".into()))?;
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let claims: IdTokenClaims =
            serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))?;
        CallerIdentity::try_from(claims)
    }
}
