//! Callable-function wire envelopes
//!
//! Requests arrive as `{"data": ...}`. Successful responses are wrapped as
//! `{"result": ...}`, failures as `{"error": {"status", "message", "details"}}`.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Incoming callable request envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallableRequest {
    /// Operation payload; `data` must be present, `null` is allowed
    pub data: Value,
}

/// Successful callable response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

impl<T> CallableResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

/// Failed callable response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallableError {
    pub error: ErrorStatus,
}

/// Body of `error` in a failed callable response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStatus {
    pub status: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T: Serialize> axum::response::IntoResponse for CallableResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_rejected() {
        assert!(serde_json::from_str::<CallableRequest>("{}").is_err());
        assert!(serde_json::from_str::<CallableRequest>(r#"{"result":1}"#).is_err());

        let req: CallableRequest = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(req.data.is_null());
    }

    #[test]
    fn test_request_keeps_payload() {
        let req: CallableRequest =
            serde_json::from_str(r#"{"data":{"uid":"abc"}}"#).unwrap();
        assert_eq!(req.data["uid"], "abc");
    }

    #[test]
    fn test_response_wraps_result() {
        let json = serde_json::to_value(CallableResponse::new(serde_json::json!({
            "success": true
        })))
        .unwrap();
        assert_eq!(json, serde_json::json!({ "result": { "success": true } }));
    }

    #[test]
    fn test_error_deserialize() {
        let body: CallableError = serde_json::from_str(
            r#"{"error":{"status":"PERMISSION_DENIED","message":"Akses ditolak."}}"#,
        )
        .unwrap();
        assert_eq!(body.error.status, ErrorCode::PermissionDenied);
        assert!(body.error.details.is_none());
    }
}
