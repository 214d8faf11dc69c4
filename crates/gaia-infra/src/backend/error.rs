use gaia_core::ports::RemoteError;
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// PostgREST codes for a table that is not provisioned.
const MISSING_RELATION_CODES: &[&str] = &["42P01", "PGRST205"];

/// Maps a transport failure (no HTTP response) to a [`RemoteError`].
pub fn classify_transport(err: &reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        RemoteError::Network(err.to_string())
    } else {
        RemoteError::classify(err.to_string())
    }
}

/// Maps a non-success response to a [`RemoteError`].
///
/// The message is taken from the JSON error body when there is one; the
/// backend services disagree on the field name.
pub fn classify_response(status: StatusCode, body: &str) -> RemoteError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let message = ["message", "msg", "error_description", "error"]
        .into_iter()
        .find_map(field)
        .map(str::to_string)
        .unwrap_or_else(|| match body.trim() {
            "" => status.to_string(),
            text => text.to_string(),
        });

    if field("code").is_some_and(|code| MISSING_RELATION_CODES.contains(&code)) {
        return RemoteError::MissingRelation(message);
    }

    match (status, RemoteError::classify(message.clone())) {
        (StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT, _) => {
            RemoteError::Timeout(message)
        }
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, RemoteError::Other(_)) => {
            RemoteError::Permission(message)
        }
        (_, classified) => classified,
    }
}

/// Passes successful responses through and converts the rest.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_response(status, &body))
}
