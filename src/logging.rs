//! Middleware that logs request and response bodies at the debug level.
//!
//! Plain text passwords must not end up in the logs, so JSON bodies have
//! their password field redacted before logging.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this are truncated in the logs.
const LOG_BODY_LENGTH_LIMIT: usize = 2048;

/// Middleware that logs the bodies of each request and its response.
///
/// Buffers the full body in memory, so this should stay out of the router in
/// deployments that accept large uploads.
pub async fn log_request_response(
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (parts, body) = request.into_parts();
    let bytes = buffer_and_log("request", body).await?;
    let request = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = buffer_and_log("response", body).await?;

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

async fn buffer_and_log(direction: &str, body: Body) -> Result<Bytes, (StatusCode, String)> {
    let bytes = to_bytes(body, usize::MAX).await.map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            format!("could not read {direction} body: {error}"),
        )
    })?;

    if let Ok(text) = std::str::from_utf8(&bytes) {
        let text = truncate_for_log(&redact_password(text));
        tracing::debug!("{direction} body = {text}");
    }

    Ok(bytes)
}

/// Replace the top-level password field of a JSON body, if there is one.
///
/// Non-JSON bodies are returned unchanged.
fn redact_password(body: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    if let Some(password) = value
        .as_object_mut()
        .and_then(|object| object.get_mut("password"))
    {
        *password = serde_json::Value::String("<redacted>".to_string());
    }

    value.to_string()
}

fn truncate_for_log(text: &str) -> String {
    if text.len() <= LOG_BODY_LENGTH_LIMIT {
        return text.to_string();
    }

    let truncated: String = text.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
    format!("{truncated}... ({} bytes total)", text.len())
}

#[cfg(test)]
mod logging_tests {
    use super::{redact_password, truncate_for_log};

    #[test]
    fn redacts_password_field() {
        let body = r#"{"email": "foo@bar.baz", "password": "hunter2"}"#;

        let redacted = redact_password(body);

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("foo@bar.baz"));
        assert!(redacted.contains("<redacted>"));
    }

    #[test]
    fn leaves_bodies_without_password_unchanged() {
        let body = r#"{"amount":12.5,"kind":"expense"}"#;

        assert_eq!(redact_password(body), body);
    }

    #[test]
    fn leaves_non_json_bodies_unchanged() {
        assert_eq!(redact_password("plain text"), "plain text");
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "x".repeat(10_000);

        let truncated = truncate_for_log(&body);

        assert!(truncated.len() < body.len());
        assert!(truncated.contains("10000 bytes total"));
    }
}
