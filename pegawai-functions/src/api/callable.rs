//! Callable request envelope extractor

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::Value;
use shared::AppError;
use shared::callable::CallableRequest;

/// `data` of a `{"data": ...}` callable envelope
///
/// A body that is not a JSON object envelope is rejected with
/// `INVALID_ARGUMENT` before any operation runs.
#[derive(Debug, Clone)]
pub struct CallableBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for CallableBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            AppError::invalid_argument("Bad Request").with_detail("cause", e.body_text())
        })?;
        let envelope: CallableRequest = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "Rejected callable envelope");
            AppError::invalid_argument("Bad Request").with_detail("cause", e.to_string())
        })?;
        Ok(CallableBody(envelope.data))
    }
}
