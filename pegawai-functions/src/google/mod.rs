//! Google REST plumbing shared by the identity and document-store adapters

pub mod credentials;

pub use credentials::{AccessTokenSource, ServiceAccountKey};

use serde::de::DeserializeOwned;

use crate::error::{RemoteError, RemoteService};

/// Decode a successful JSON response, or turn an error response into
/// [`RemoteError::Status`] carrying the remote error message
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: RemoteService,
    resp: reqwest::Response,
) -> Result<T, RemoteError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|source| RemoteError::Transport { service, source })?;

    if !status.is_success() {
        return Err(RemoteError::status(
            service,
            status.as_u16(),
            error_message(&body),
        ));
    }

    // Some endpoints answer with an empty body on success
    let body = if body.trim().is_empty() { "{}" } else { &body };
    serde_json::from_str(body).map_err(|e| RemoteError::decode(service, e))
}

/// Extract a readable message from a Google API or OAuth2 error body
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match &value["error"] {
        // {"error": {"code": 400, "message": "EMAIL_EXISTS", "status": "..."}}
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| obj.get("status").and_then(|s| s.as_str()))
            .unwrap_or("unknown error")
            .to_string(),
        // {"error": "invalid_grant", "error_description": "..."}
        serde_json::Value::String(code) => match value["error_description"].as_str() {
            Some(desc) => format!("{code}: {desc}"),
            None => code.clone(),
        },
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"USER_NOT_FOUND","errors":[]}}"#;
        assert_eq!(error_message(body), "USER_NOT_FOUND");

        let body = r#"{"error":{"code":404,"status":"NOT_FOUND"}}"#;
        assert_eq!(error_message(body), "NOT_FOUND");
    }

    #[test]
    fn oauth_error_message() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#;
        assert_eq!(error_message(body), "invalid_grant: Invalid JWT Signature.");
        assert_eq!(error_message(r#"{"error":"invalid_client"}"#), "invalid_client");
    }

    #[test]
    fn non_json_body_is_kept() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
