//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks and backend detail extraction so the
//! endpoint modules stay focused on request construction and mapping.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GatewayError;

/// Longest plain-text body passed through as an error message.
const MAX_PLAIN_MESSAGE: usize = 300;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success. Otherwise produces
/// [`GatewayError::Server`] carrying the backend's detail message.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| fallback_message(status));
    tracing::debug!(status = status.as_u16(), %message, "backend returned error status");
    Err(GatewayError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Check the status and decode a JSON body.
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GatewayError> {
    let resp = check_response(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(GatewayError::from)
}

/// Pull a user-facing message out of an error body.
///
/// Understands FastAPI-style `{"detail": "..."}`, validation lists
/// (`{"detail": [{"msg": "..."}]}`), and `message`/`error` keys. Short
/// non-JSON bodies are returned trimmed.
#[must_use]
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return (trimmed.len() <= MAX_PLAIN_MESSAGE && !trimmed.starts_with('<'))
            .then(|| trimmed.to_string());
    };

    match value.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            if let Some(msg) = items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
            {
                return Some(msg.to_string());
            }
        }
        Some(Value::Object(map)) => {
            if let Some(msg) = map
                .get("message")
                .or_else(|| map.get("msg"))
                .and_then(Value::as_str)
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }

    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn fallback_message(status: StatusCode) -> String {
    format!("request failed with status {status}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[rstest]
    #[case(r#"{"detail": "model unavailable"}"#, Some("model unavailable"))]
    #[case(
        r#"{"detail": [{"loc": ["body", "image"], "msg": "field required", "type": "missing"}]}"#,
        Some("field required")
    )]
    #[case(r#"{"detail": {"message": "code already used"}}"#, Some("code already used"))]
    #[case(r#"{"message": "pickup slot full"}"#, Some("pickup slot full"))]
    #[case(r#"{"error": "bad gateway"}"#, Some("bad gateway"))]
    #[case("upstream timeout", Some("upstream timeout"))]
    #[case("<html><body>502</body></html>", None)]
    #[case("   ", None)]
    #[case(r#"{"status": "nope"}"#, None)]
    fn extracts_messages(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_message(body).as_deref(), expected);
    }

    #[tokio::test]
    async fn check_response_success_passes_through() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_keeps_backend_detail() {
        let resp = mock_response(500, r#"{"detail": "model unavailable"}"#);
        let err = check_response(resp).await.unwrap_err();
        match err {
            GatewayError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_response_falls_back_to_status_text() {
        let resp = mock_response(503, "");
        let err = check_response(resp).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "request failed with status 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn read_json_reports_parse_errors() {
        let resp = mock_response(200, "not json");
        let err = read_json::<serde_json::Value>(resp).await.unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }
}
