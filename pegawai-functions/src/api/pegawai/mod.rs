//! Pegawai callable functions

mod handler;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Callable routes, under both the current and the legacy `*Pegawai` names
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createEmployee", post(handler::create))
        .route("/updateEmployee", post(handler::update))
        .route("/deleteEmployee", post(handler::delete))
        .route("/createPegawai", post(handler::create))
        .route("/updatePegawai", post(handler::update))
        .route("/deletePegawai", post(handler::delete))
}
