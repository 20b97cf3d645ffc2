//! Test fixtures: token signing helpers, an in-memory backend, and a stub
//! HTTP server for the REST adapters

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use shared::models::{PegawaiProfile, Role};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::auth::firebase::{JwksKey, JwksKeySet};
use crate::error::{RemoteError, RemoteService, WriteStage};
use crate::identity::{IdentityService, IdentityUpdate};
use crate::profiles::ProfileStore;

pub const TEST_SECRET: &str = "pegawai-test-secret";
pub const TEST_KEY_ID: &str = "test-key";
pub const TEST_RSA_KEY_PEM: &str = include_str!("testdata/test_rsa_key.pem");
const TEST_RSA_N: &str = include_str!("testdata/test_rsa_n.txt");

/// HS256 token for [`TEST_SECRET`]
pub fn sign_hs256(uid: &str, role: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = serde_json::json!({
        "sub": uid,
        "iat": now,
        "exp": now + 600,
    });
    if let Some(role) = role {
        claims["role"] = role.into();
    }
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// RS256 token signed with the test key, header `kid` set to `kid`
pub fn sign_rs256(kid: &str, claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(TEST_RSA_KEY_PEM.as_bytes()).unwrap(),
    )
    .unwrap()
}

/// Public half of the test key as a key set
pub fn test_key_set() -> JwksKeySet {
    JwksKeySet {
        keys: vec![JwksKey {
            kid: Some(TEST_KEY_ID.to_string()),
            n: TEST_RSA_N.trim().to_string(),
            e: "AQAB".to_string(),
        }],
    }
}

/// Remote call observed by [`FakeBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAccount { email: String },
    SetRoleClaim { id: String, role: Role },
    UpdateAccount { id: String, update: IdentityUpdate },
    DeleteAccount { id: String },
    PutProfile { id: String },
    UpdateProfileField { id: String, field: String, value: String },
    DeleteProfile { id: String },
}

impl Call {
    pub fn is_profile_write(&self) -> bool {
        matches!(
            self,
            Call::PutProfile { .. } | Call::UpdateProfileField { .. } | Call::DeleteProfile { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Option<Role>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, FakeAccount>,
    profiles: HashMap<String, BTreeMap<String, String>>,
    journal: Vec<Call>,
    failing: Vec<WriteStage>,
    next_id: u64,
}

/// In-memory identity service and profile store sharing one call journal
///
/// Error responses mirror the real services: `EMAIL_EXISTS` and
/// `USER_NOT_FOUND` from the identity side, `NOT_FOUND` when updating a
/// missing document.
#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call of `stage` fail with a 503
    pub fn fail_at(&self, stage: WriteStage) {
        self.inner.lock().failing.push(stage);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().journal.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().journal.clear();
    }

    pub fn account(&self, id: &str) -> Option<FakeAccount> {
        self.inner.lock().accounts.get(id).cloned()
    }

    pub fn profile(&self, id: &str) -> Option<BTreeMap<String, String>> {
        self.inner.lock().profiles.get(id).cloned()
    }

    /// Insert an existing pegawai with account and profile, bypassing the journal
    pub fn seed(&self, id: &str, email: &str) {
        let mut inner = self.inner.lock();
        inner.accounts.insert(
            id.to_string(),
            FakeAccount {
                email: email.to_string(),
                password: "sandi-lama".to_string(),
                display_name: "Pegawai Lama".to_string(),
                role: Some(Role::Pegawai),
            },
        );
        let profile = PegawaiProfile {
            name: "Pegawai Lama".to_string(),
            email: email.to_string(),
            role: Role::Pegawai,
            organization: "Dinas Kesehatan".to_string(),
            organization_code: "DKS-01".to_string(),
        };
        inner.profiles.insert(id.to_string(), to_fields(&profile));
    }

    /// Record `call` and apply injected faults for `stage`
    fn record(inner: &mut Inner, stage: WriteStage, call: Call) -> Result<(), RemoteError> {
        inner.journal.push(call);
        if inner.failing.contains(&stage) {
            let service = match stage {
                WriteStage::ProfilePut | WriteStage::ProfileUpdate | WriteStage::ProfileDelete => {
                    RemoteService::DocumentStore
                }
                _ => RemoteService::Identity,
            };
            return Err(RemoteError::status(service, 503, "injected failure"));
        }
        Ok(())
    }
}

fn to_fields(profile: &PegawaiProfile) -> BTreeMap<String, String> {
    profile
        .fields()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn user_not_found() -> RemoteError {
    RemoteError::status(RemoteService::Identity, 400, "USER_NOT_FOUND")
}

fn email_exists() -> RemoteError {
    RemoteError::status(RemoteService::Identity, 400, "EMAIL_EXISTS")
}

#[async_trait]
impl IdentityService for FakeBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::IdentityCreate,
            Call::CreateAccount {
                email: email.to_string(),
            },
        )?;
        if inner.accounts.values().any(|a| a.email == email) {
            return Err(email_exists());
        }
        inner.next_id += 1;
        let id = format!("uid-{}", inner.next_id);
        inner.accounts.insert(
            id.clone(),
            FakeAccount {
                email: email.to_string(),
                password: password.to_string(),
                display_name: display_name.to_string(),
                role: None,
            },
        );
        Ok(id)
    }

    async fn set_role_claim(&self, id: &str, role: Role) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::RoleClaim,
            Call::SetRoleClaim {
                id: id.to_string(),
                role,
            },
        )?;
        let account = inner.accounts.get_mut(id).ok_or_else(user_not_found)?;
        account.role = Some(role);
        Ok(())
    }

    async fn update_account(&self, id: &str, update: &IdentityUpdate) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::IdentityUpdate,
            Call::UpdateAccount {
                id: id.to_string(),
                update: update.clone(),
            },
        )?;
        if let Some(email) = &update.email
            && inner
                .accounts
                .iter()
                .any(|(other, a)| other != id && &a.email == email)
        {
            return Err(email_exists());
        }
        let account = inner.accounts.get_mut(id).ok_or_else(user_not_found)?;
        if let Some(email) = &update.email {
            account.email = email.clone();
        }
        if let Some(password) = &update.password {
            account.password = password.clone();
        }
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::IdentityDelete,
            Call::DeleteAccount { id: id.to_string() },
        )?;
        inner
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(user_not_found)
    }
}

#[async_trait]
impl ProfileStore for FakeBackend {
    async fn put_profile(&self, id: &str, profile: &PegawaiProfile) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::ProfilePut,
            Call::PutProfile { id: id.to_string() },
        )?;
        inner.profiles.insert(id.to_string(), to_fields(profile));
        Ok(())
    }

    async fn update_profile_field(
        &self,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::ProfileUpdate,
            Call::UpdateProfileField {
                id: id.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            },
        )?;
        let doc = inner
            .profiles
            .get_mut(id)
            .ok_or_else(|| RemoteError::status(RemoteService::DocumentStore, 404, "NOT_FOUND"))?;
        doc.insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_profile(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::record(
            &mut inner,
            WriteStage::ProfileDelete,
            Call::DeleteProfile { id: id.to_string() },
        )?;
        inner.profiles.remove(id);
        Ok(())
    }
}

/// Request as seen by a [`StubServer`]
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: http::Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// JSON body, `Null` when empty or not JSON
    pub body: serde_json::Value,
}

/// Local HTTP server answering every request through one closure
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&StubRequest) -> (http::StatusCode, String) + Send + Sync + 'static,
    {
        let respond = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let journal = requests.clone();

        let app = axum::Router::new().fallback(
            move |method: http::Method,
                  uri: http::Uri,
                  headers: http::HeaderMap,
                  body: axum::body::Bytes| {
                let respond = respond.clone();
                let journal = journal.clone();
                async move {
                    let req = StubRequest {
                        method,
                        path: uri.path().to_string(),
                        query: uri.query().map(String::from),
                        authorization: headers
                            .get(http::header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(String::from),
                        body: serde_json::from_slice(&body).unwrap_or_default(),
                    };
                    let resp = respond(&req);
                    journal.lock().push(req);
                    resp
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().clone()
    }
}
