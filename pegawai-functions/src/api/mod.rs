//! HTTP routes for pegawai-functions

pub mod callable;
pub mod health;
pub mod pegawai;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

/// UUID v4 request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Callable functions - admin gate applied per operation
        .merge(pegawai::router())
        // Health - public
        .merge(health::router())
}

/// Build the application with middleware and state
pub fn build_app(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    build_router()
        // Callables are invoked from web and mobile clients
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Set wraps Propagate so the generated id reaches the response
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}
