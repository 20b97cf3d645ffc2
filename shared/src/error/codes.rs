//! Callable error codes
//!
//! Only the statuses of the callable-function protocol this service can emit
//! are modelled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error status carried in `error.status` of a callable error body
///
/// Serialized as the protocol's SCREAMING_SNAKE_CASE status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request envelope is not a callable request
    InvalidArgument,
    /// Caller does not hold the role the operation requires
    PermissionDenied,
    /// A remote call failed or request data could not be used
    Internal,
}

impl ErrorCode {
    /// Client SDK error kind, e.g. `permission-denied`
    pub const fn kind(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::Internal => "internal",
        }
    }

    /// Whether this error originates on the server side (logged, not caller-fixable)
    #[inline]
    pub const fn is_system(&self) -> bool {
        matches!(self, ErrorCode::Internal)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
