//! Data models
//!
//! Shared between the functions service and its clients (via the callable API).

pub mod pegawai;

// Re-exports
pub use pegawai::*;
