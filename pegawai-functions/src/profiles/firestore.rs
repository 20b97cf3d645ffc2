//! Cloud Firestore profile store (REST v1 document API)

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{Map, Value, json};
use shared::models::PegawaiProfile;
use std::sync::Arc;

use super::ProfileStore;
use crate::error::{BoxError, RemoteError, RemoteService};
use crate::google::{self, AccessTokenSource};

pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreProfileStore {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    collection: String,
    tokens: Arc<AccessTokenSource>,
}

impl FirestoreProfileStore {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        tokens: Arc<AccessTokenSource>,
    ) -> Result<Self, BoxError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Firestore base URL {base_url} cannot hold a path").into());
        }
        Ok(Self {
            http,
            base_url,
            project_id: project_id.into(),
            collection: collection.into(),
            tokens,
        })
    }

    /// Base URL of a local Firestore emulator at `host` (`127.0.0.1:8080`)
    pub fn emulator_base_url(host: &str) -> String {
        format!("http://{host}/v1")
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// `{base}/projects/{p}/databases/(default)/documents/{collection}/{id}`
    fn document_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                self.collection.as_str(),
                id,
            ]);
        }
        url
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<(), RemoteError> {
        let bearer = self.tokens.bearer(&self.http).await?;
        let mut req = self.http.request(method, url).bearer_auth(bearer);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.map_err(|source| RemoteError::Transport {
            service: RemoteService::DocumentStore,
            source,
        })?;
        let _: Value = google::read_json(RemoteService::DocumentStore, resp).await?;
        Ok(())
    }
}

/// Firestore `fields` map of string values
fn string_fields<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Value {
    let fields: Map<String, Value> = pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!({ "stringValue": value })))
        .collect();
    json!({ "fields": fields })
}

/// Field path as used in an update mask; non-identifier names are quoted
fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn put_profile(&self, id: &str, profile: &PegawaiProfile) -> Result<(), RemoteError> {
        // PATCH without a mask replaces the whole document, creating it if needed
        let body = string_fields(profile.fields());
        self.send(Method::PATCH, self.document_url(id), Some(body))
            .await
    }

    async fn update_profile_field(
        &self,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        let mut url = self.document_url(id);
        url.query_pairs_mut()
            .append_pair("updateMask.fieldPaths", &field_path(field))
            .append_pair("currentDocument.exists", "true");
        let body = string_fields([(field, value)]);
        self.send(Method::PATCH, url, Some(body)).await
    }

    async fn delete_profile(&self, id: &str) -> Result<(), RemoteError> {
        self.send(Method::DELETE, self.document_url(id), None).await
    }
}
