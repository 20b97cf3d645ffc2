//! Application state for pegawai-functions

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    EmulatorTokenVerifier, FirebaseIdTokenVerifier, SharedSecretVerifier, TokenVerifier,
};
use crate::config::{Config, CredentialsConfig};
use crate::error::BoxError;
use crate::google::{AccessTokenSource, ServiceAccountKey};
use crate::identity::{FirebaseAuthClient, IdentityService, firebase::IDENTITY_TOOLKIT_URL};
use crate::pegawai::PegawaiService;
use crate::profiles::{FirestoreProfileStore, ProfileStore, firestore::FIRESTORE_URL};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pegawai: Arc<PegawaiService>,
    /// Turns caller bearer tokens into identities
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(pegawai: Arc<PegawaiService>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { pegawai, verifier }
    }

    /// Wire the Firebase adapters described by `config`
    pub fn from_config(config: &Config) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let tokens = Arc::new(token_source(&config.credentials)?);
        tracing::info!(source = tokens.name(), "Google API credentials configured");
        let emulator_tokens = Arc::new(AccessTokenSource::Emulator);

        let identity: Arc<dyn IdentityService> = match &config.auth_emulator_host {
            Some(host) => {
                tracing::info!(host = %host, "Using auth emulator");
                Arc::new(FirebaseAuthClient::new(
                    http.clone(),
                    FirebaseAuthClient::emulator_base_url(host),
                    &config.project_id,
                    emulator_tokens.clone(),
                ))
            }
            None => Arc::new(FirebaseAuthClient::new(
                http.clone(),
                IDENTITY_TOOLKIT_URL,
                &config.project_id,
                tokens.clone(),
            )),
        };

        let profile_store = match &config.firestore_emulator_host {
            Some(host) => {
                tracing::info!(host = %host, "Using Firestore emulator");
                FirestoreProfileStore::new(
                    http.clone(),
                    &FirestoreProfileStore::emulator_base_url(host),
                    &config.project_id,
                    &config.profile_collection,
                    emulator_tokens,
                )?
            }
            None => FirestoreProfileStore::new(
                http.clone(),
                FIRESTORE_URL,
                &config.project_id,
                &config.profile_collection,
                tokens,
            )?,
        };
        tracing::info!(collection = profile_store.collection(), "Profile store configured");
        let profiles: Arc<dyn ProfileStore> = Arc::new(profile_store);

        let verifier: Arc<dyn TokenVerifier> = if let Some(secret) = &config.caller_token_secret {
            tracing::warn!("Caller tokens verified with a shared secret (development only)");
            Arc::new(SharedSecretVerifier::new(secret))
        } else if config.is_development() && config.auth_emulator_host.is_some() {
            tracing::warn!("Caller tokens accepted unsigned from the auth emulator");
            Arc::new(EmulatorTokenVerifier)
        } else {
            Arc::new(FirebaseIdTokenVerifier::new(http, &config.project_id))
        };

        Ok(Self::new(
            Arc::new(PegawaiService::new(identity, profiles)),
            verifier,
        ))
    }
}

fn token_source(credentials: &CredentialsConfig) -> Result<AccessTokenSource, BoxError> {
    Ok(match credentials {
        CredentialsConfig::Emulator => AccessTokenSource::Emulator,
        CredentialsConfig::AccessToken(token) => AccessTokenSource::Static(token.clone()),
        CredentialsConfig::ServiceAccountFile(path) => {
            AccessTokenSource::service_account(ServiceAccountKey::from_file(path)?)
        }
        CredentialsConfig::Metadata => AccessTokenSource::metadata(),
    })
}
