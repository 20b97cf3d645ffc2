//! Firebase ID token verification (RS256 against Google's securetoken keys)

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CallerIdentity;
use super::verifier::{IdTokenClaims, TokenError, TokenVerifier};

pub const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const JWKS_TTL_SECS: i64 = 3600;

/// JSON Web Key Set
#[derive(Debug, Clone, Deserialize)]
pub struct JwksKeySet {
    pub keys: Vec<JwksKey>,
}

impl JwksKeySet {
    pub fn find_key(&self, kid: &str) -> Option<&JwksKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// RSA public key of a key set
#[derive(Debug, Clone, Deserialize)]
pub struct JwksKey {
    pub kid: Option<String>,
    /// Modulus (base64url)
    pub n: String,
    /// Public exponent (base64url)
    pub e: String,
}

#[derive(Clone)]
struct CachedKeys {
    keys: JwksKeySet,
    fetched_at: i64,
}

/// Verifies ID tokens issued for one Firebase project
pub struct FirebaseIdTokenVerifier {
    http: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache: Arc<RwLock<Option<CachedKeys>>>,
}

impl FirebaseIdTokenVerifier {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>) -> Self {
        Self {
            http,
            project_id: project_id.into(),
            jwks_url: SECURETOKEN_JWKS_URL.to_string(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    async fn fetch_keys(&self) -> Result<JwksKeySet, TokenError> {
        let resp = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TokenError::KeysUnavailable(e.to_string()))?;
        resp.json::<JwksKeySet>()
            .await
            .map_err(|e| TokenError::KeysUnavailable(e.to_string()))
    }

    async fn keys(&self, force_refresh: bool) -> Result<JwksKeySet, TokenError> {
        let now = chrono::Utc::now().timestamp();
        if !force_refresh {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref()
                && now - entry.fetched_at < JWKS_TTL_SECS
            {
                return Ok(entry.keys.clone());
            }
        }

        let keys = self.fetch_keys().await?;
        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
        });
        Ok(keys)
    }

    /// Verify `token` against an already fetched key set
    pub fn verify_with_keys(
        &self,
        token: &str,
        keys: &JwksKeySet,
    ) -> Result<CallerIdentity, TokenError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(TokenError::MissingKeyId)?;
        let jwk = keys
            .find_key(&kid)
            .ok_or_else(|| TokenError::UnknownKey(kid.clone()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer()]);
        validation.set_audience(&[&self.project_id]);
        validation.leeway = 60;

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)?;
        let data = decode::<IdTokenClaims>(token, &key, &validation)?;
        CallerIdentity::try_from(data.claims)
    }
}

#[async_trait]
impl TokenVerifier for FirebaseIdTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenError> {
        let keys = self.keys(false).await?;
        match self.verify_with_keys(token, &keys) {
            // Keys rotate; retry once with a fresh set.
            Err(TokenError::UnknownKey(_)) => {
                let keys = self.keys(true).await?;
                self.verify_with_keys(token, &keys)
            }
            other => other,
        }
    }
}
