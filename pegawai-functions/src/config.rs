//! Service configuration

use std::path::PathBuf;

use crate::error::BoxError;

/// Where Google API bearer tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsConfig {
    /// Emulators accept the fixed owner credential
    Emulator,
    /// Pre-issued access token (env: GOOGLE_OAUTH_ACCESS_TOKEN)
    AccessToken(String),
    /// Service account key file (env: GOOGLE_APPLICATION_CREDENTIALS)
    ServiceAccountFile(PathBuf),
    /// Instance metadata server
    Metadata,
}

/// pegawai-functions configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port (env: PORT, as set by Cloud Run, or HTTP_PORT)
    pub http_port: u16,
    /// Firebase / Google Cloud project id
    pub project_id: String,
    /// Firestore collection holding profile documents
    pub profile_collection: String,
    /// Auth emulator host:port (env: FIREBASE_AUTH_EMULATOR_HOST)
    pub auth_emulator_host: Option<String>,
    /// Firestore emulator host:port (env: FIRESTORE_EMULATOR_HOST)
    pub firestore_emulator_host: Option<String>,
    pub credentials: CredentialsConfig,
    /// HS256 secret for caller tokens, development only (env: CALLER_TOKEN_SECRET)
    pub caller_token_secret: Option<String>,
    /// Request timeout of the outbound HTTP client
    pub http_timeout_secs: u64,
    /// Emit JSON log lines (env: LOG_FORMAT=json)
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BoxError> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_dev = environment == "development";

        let project_id = var("FIREBASE_PROJECT_ID")
            .or_else(|| var("GOOGLE_CLOUD_PROJECT"))
            .or_else(|| var("GCLOUD_PROJECT"))
            .ok_or("FIREBASE_PROJECT_ID must be set")?;

        let auth_emulator_host = var("FIREBASE_AUTH_EMULATOR_HOST");
        let firestore_emulator_host = var("FIRESTORE_EMULATOR_HOST");

        let credentials = if auth_emulator_host.is_some() && firestore_emulator_host.is_some() {
            CredentialsConfig::Emulator
        } else if let Some(token) = var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            CredentialsConfig::AccessToken(token)
        } else if let Some(path) = var("GOOGLE_APPLICATION_CREDENTIALS") {
            CredentialsConfig::ServiceAccountFile(PathBuf::from(path))
        } else {
            CredentialsConfig::Metadata
        };

        let caller_token_secret = var("CALLER_TOKEN_SECRET");
        if caller_token_secret.is_some() && !is_dev {
            return Err(format!(
                "CALLER_TOKEN_SECRET is only allowed in development, not in {environment}"
            )
            .into());
        }
        if !is_dev && (auth_emulator_host.is_some() || firestore_emulator_host.is_some()) {
            return Err(format!("Emulator hosts must not be set in {environment}").into());
        }

        Ok(Self {
            http_port: var("PORT")
                .or_else(|| var("HTTP_PORT"))
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            project_id,
            profile_collection: var("PROFILE_COLLECTION").unwrap_or_else(|| "users".into()),
            auth_emulator_host,
            firestore_emulator_host,
            credentials,
            caller_token_secret,
            http_timeout_secs: var("HTTP_CLIENT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
