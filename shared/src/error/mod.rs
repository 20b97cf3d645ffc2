//! Error system for callable operations
//!
//! - [`ErrorCode`]: callable protocol status codes
//! - [`AppError`]: error with code, fixed message, and diagnostic details
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::permission_denied("Akses ditolak.");
//! assert_eq!(err.code, ErrorCode::PermissionDenied);
//!
//! let err = AppError::internal("Gagal mengedit akun.").with_detail("stage", "identity_update");
//! let body = err.to_callable();
//! assert_eq!(body.error.status, ErrorCode::Internal);
//! ```

mod codes;
mod http;
mod types;

pub use codes::ErrorCode;
pub use types::{AppError, AppResult};
