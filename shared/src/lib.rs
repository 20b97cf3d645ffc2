//! Shared types for the pegawai administration functions
//!
//! Wire types used by the service and its clients: callable envelopes,
//! error codes, and the pegawai request/response/profile models.

pub mod callable;
pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorCode};
pub use http;
