//! Firebase Authentication via the Identity Toolkit REST API (v1)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shared::models::Role;
use std::sync::Arc;

use super::{IdentityService, IdentityUpdate};
use crate::error::{RemoteError, RemoteService};
use crate::google::{self, AccessTokenSource};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedAccount {
    local_id: String,
}

pub struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<AccessTokenSource>,
}

impl FirebaseAuthClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<AccessTokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
        }
    }

    /// Base URL of a local auth emulator at `host` (`127.0.0.1:9099`)
    pub fn emulator_base_url(host: &str) -> String {
        format!("http://{host}/identitytoolkit.googleapis.com")
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.base_url, self.project_id, action
        )
    }

    async fn call<T, B>(&self, action: &str, body: &B) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bearer = self.tokens.bearer(&self.http).await?;
        let resp = self
            .http
            .post(self.endpoint(action))
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                service: RemoteService::Identity,
                source,
            })?;
        google::read_json(RemoteService::Identity, resp).await
    }
}

/// `accounts:update` body for a partial credential update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    local_id: &'a str,
    #[serde(flatten)]
    update: &'a IdentityUpdate,
}

/// `accounts:update` body replacing custom claims with the role claim
fn role_claim_body(id: &str, role: Role) -> Value {
    let attributes = json!({ "role": role.as_str() }).to_string();
    json!({ "localId": id, "customAttributes": attributes })
}

#[async_trait]
impl IdentityService for FirebaseAuthClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, RemoteError> {
        let created: CreatedAccount = self
            .call(
                "accounts",
                &json!({
                    "email": email,
                    "password": password,
                    "displayName": display_name,
                }),
            )
            .await?;
        Ok(created.local_id)
    }

    async fn set_role_claim(&self, id: &str, role: Role) -> Result<(), RemoteError> {
        let _: Value = self
            .call("accounts:update", &role_claim_body(id, role))
            .await?;
        Ok(())
    }

    async fn update_account(&self, id: &str, update: &IdentityUpdate) -> Result<(), RemoteError> {
        let body = UpdateRequest {
            local_id: id,
            update,
        };
        let _: Value = self.call("accounts:update", &body).await?;
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<(), RemoteError> {
        let _: Value = self
            .call("accounts:delete", &json!({ "localId": id }))
            .await?;
        Ok(())
    }
}
