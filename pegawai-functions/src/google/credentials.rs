//! OAuth2 access tokens for Google APIs
//!
//! Both REST adapters share one [`AccessTokenSource`]. Fetched tokens are
//! cached until shortly before they expire.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{BoxError, RemoteError, RemoteService};

const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                      https://www.googleapis.com/auth/identitytoolkit \
                      https://www.googleapis.com/auth/userinfo.email";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Service account key file contents (the fields used here)
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, BoxError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read credentials {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Access token with its absolute expiry (unix seconds)
#[derive(Debug, Clone)]
pub struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Where bearer tokens for the identity service and document store come from
pub enum AccessTokenSource {
    /// Local emulators accept the fixed `owner` credential
    Emulator,
    /// Pre-issued token (e.g. `gcloud auth print-access-token`)
    Static(String),
    /// JWT-bearer exchange signed with a service account key
    ServiceAccount {
        key: ServiceAccountKey,
        cache: Arc<RwLock<Option<CachedToken>>>,
    },
    /// Instance metadata server (Cloud Run, Cloud Functions, GCE)
    Metadata {
        cache: Arc<RwLock<Option<CachedToken>>>,
    },
}

impl AccessTokenSource {
    pub fn service_account(key: ServiceAccountKey) -> Self {
        AccessTokenSource::ServiceAccount {
            key,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn metadata() -> Self {
        AccessTokenSource::Metadata {
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccessTokenSource::Emulator => "emulator",
            AccessTokenSource::Static(_) => "static",
            AccessTokenSource::ServiceAccount { .. } => "service_account",
            AccessTokenSource::Metadata { .. } => "metadata",
        }
    }

    /// Current bearer token, fetching a new one when the cached one is stale
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String, RemoteError> {
        match self {
            AccessTokenSource::Emulator => Ok("owner".to_string()),
            AccessTokenSource::Static(token) => Ok(token.clone()),
            AccessTokenSource::ServiceAccount { key, cache } => {
                cached_or_fetch(cache, || exchange_assertion(http, key)).await
            }
            AccessTokenSource::Metadata { cache } => {
                cached_or_fetch(cache, || fetch_metadata_token(http)).await
            }
        }
    }
}

async fn cached_or_fetch<F, Fut>(
    cache: &RwLock<Option<CachedToken>>,
    fetch: F,
) -> Result<String, RemoteError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<TokenResponse, RemoteError>>,
{
    let now = chrono::Utc::now().timestamp();
    {
        let cached = cache.read().await;
        if let Some(entry) = cached.as_ref()
            && entry.expires_at - EXPIRY_MARGIN_SECS > now
        {
            return Ok(entry.token.clone());
        }
    }

    let fresh = fetch().await?;
    *cache.write().await = Some(CachedToken {
        token: fresh.access_token.clone(),
        expires_at: now + fresh.expires_in,
    });
    Ok(fresh.access_token)
}

/// Signed JWT-bearer assertion for `key`
fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, RemoteError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| RemoteError::Credentials(format!("invalid service account key: {e}")))?;
    jsonwebtoken::encode(&header, &claims, &signing_key)
        .map_err(|e| RemoteError::Credentials(format!("cannot sign assertion: {e}")))
}

async fn exchange_assertion(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<TokenResponse, RemoteError> {
    let assertion = sign_assertion(key, chrono::Utc::now().timestamp())?;
    let resp = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .map_err(|source| RemoteError::Transport {
            service: RemoteService::TokenEndpoint,
            source,
        })?;
    super::read_json(RemoteService::TokenEndpoint, resp).await
}

async fn fetch_metadata_token(http: &reqwest::Client) -> Result<TokenResponse, RemoteError> {
    let resp = http
        .get(METADATA_TOKEN_URL)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|source| RemoteError::Transport {
            service: RemoteService::TokenEndpoint,
            source,
        })?;
    super::read_json(RemoteService::TokenEndpoint, resp).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TEST_RSA_KEY_PEM, test_key_set};
    use jsonwebtoken::{DecodingKey, Validation};

    fn key() -> ServiceAccountKey {
        serde_json::from_value(serde_json::json!({
            "type": "service_account",
            "client_email": "functions@sim-pegawai.iam.gserviceaccount.com",
            "private_key": TEST_RSA_KEY_PEM,
            "private_key_id": "test-key",
        }))
        .unwrap()
    }

    #[test]
    fn key_file_defaults_token_uri() {
        assert_eq!(key().token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn assertion_is_verifiable_with_public_key() {
        let now = chrono::Utc::now().timestamp();
        let assertion = sign_assertion(&key(), now).unwrap();

        let header = jsonwebtoken::decode_header(&assertion).unwrap();
        assert_eq!(header.kid.as_deref(), Some("test-key"));

        let jwk = test_key_set().keys.remove(0);
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[DEFAULT_TOKEN_URI]);
        let data = jsonwebtoken::decode::<serde_json::Value>(
            &assertion,
            &DecodingKey::from_rsa_components(&jwk.n, &jwk.e).unwrap(),
            &validation,
        )
        .unwrap();
        assert_eq!(
            data.claims["iss"],
            "functions@sim-pegawai.iam.gserviceaccount.com"
        );
        assert_eq!(data.claims["exp"], now + ASSERTION_LIFETIME_SECS);
        assert!(data.claims["scope"].as_str().unwrap().contains("identitytoolkit"));
    }

    #[test]
    fn bad_private_key_is_credentials_error() {
        let mut k = key();
        k.private_key = "not a pem".into();
        assert!(matches!(
            sign_assertion(&k, 0),
            Err(RemoteError::Credentials(_))
        ));
    }

    #[tokio::test]
    async fn fixed_sources_need_no_network() {
        let http = reqwest::Client::new();
        assert_eq!(
            AccessTokenSource::Emulator.bearer(&http).await.unwrap(),
            "owner"
        );
        assert_eq!(
            AccessTokenSource::Static("ya29.token".into())
                .bearer(&http)
                .await
                .unwrap(),
            "ya29.token"
        );
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_margin() {
        let cache = RwLock::new(None);
        let first = cached_or_fetch(&cache, || async {
            Ok(TokenResponse {
                access_token: "t1".into(),
                expires_in: 3600,
            })
        })
        .await
        .unwrap();
        assert_eq!(first, "t1");

        let second = cached_or_fetch(&cache, || async {
            Ok(TokenResponse {
                access_token: "t2".into(),
                expires_in: 3600,
            })
        })
        .await
        .unwrap();
        assert_eq!(second, "t1");

        // Within the refresh margin the token is replaced
        cache.write().await.as_mut().unwrap().expires_at = chrono::Utc::now().timestamp() + 10;
        let third = cached_or_fetch(&cache, || async {
            Ok(TokenResponse {
                access_token: "t3".into(),
                expires_in: 3600,
            })
        })
        .await
        .unwrap();
        assert_eq!(third, "t3");
    }
}
