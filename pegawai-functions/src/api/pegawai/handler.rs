//! Pegawai callable handlers

use axum::extract::State;
use shared::AppResult;
use shared::callable::CallableResponse;
use shared::models::{Ack, PegawaiCreated};

use crate::api::callable::CallableBody;
use crate::auth::Caller;
use crate::pegawai::Operation;
use crate::state::AppState;

/// Create a pegawai account
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    CallableBody(data): CallableBody,
) -> AppResult<CallableResponse<PegawaiCreated>> {
    state
        .pegawai
        .create(caller.as_ref(), data)
        .await
        .map(CallableResponse::new)
        .map_err(|e| e.into_app_error(Operation::Create))
}

/// Change a pegawai's email and/or password
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    CallableBody(data): CallableBody,
) -> AppResult<CallableResponse<Ack>> {
    state
        .pegawai
        .update(caller.as_ref(), data)
        .await
        .map(CallableResponse::new)
        .map_err(|e| e.into_app_error(Operation::Update))
}

/// Delete a pegawai account and profile
pub async fn delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    CallableBody(data): CallableBody,
) -> AppResult<CallableResponse<Ack>> {
    state
        .pegawai
        .delete(caller.as_ref(), data)
        .await
        .map(CallableResponse::new)
        .map_err(|e| e.into_app_error(Operation::Delete))
}
