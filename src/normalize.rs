//! Maps provider-specific success and error payload shapes into a canonical
//! outcome: the extracted result text, or a classified [`GatewayError`].
//!
//! Error bodies are probed over loose JSON in a fixed priority order —
//! `message` field, then `error` field, then the HTTP status line — and the
//! probe never raises on a shape mismatch. Success bodies are held to the
//! opposite discipline: a 2xx response missing its result field is
//! `Protocol`, never an empty success.

use crate::errors::GatewayError;
use crate::types::UploadHandle;
use serde_json::Value;

/// Extracts the `answer` field from a completion response.
///
/// # Errors
///
/// `Remote` for a non-2xx status; `Protocol` for an unparseable 2xx body or
/// one whose `answer` field is absent, null, or not a string.
pub fn extract_answer(status: u16, body: &str) -> Result<String, GatewayError> {
    let value = success_value(status, body)?;
    match value.get("answer") {
        Some(Value::String(answer)) => Ok(answer.clone()),
        Some(Value::Null) | None => Err(GatewayError::Protocol(
            "completion response missing the answer field".to_string(),
        )),
        Some(other) => Err(GatewayError::Protocol(format!(
            "answer field is not a string: {other}"
        ))),
    }
}

/// Extracts the `id` field from an upload response.
///
/// # Errors
///
/// Same classification as [`extract_answer`], over the `id` field.
pub fn extract_upload_id(status: u16, body: &str) -> Result<UploadHandle, GatewayError> {
    let value = success_value(status, body)?;
    match value.get("id") {
        Some(Value::String(id)) => Ok(UploadHandle {
            file_id: id.clone(),
        }),
        Some(Value::Null) | None => Err(GatewayError::Protocol(
            "upload response missing the id field".to_string(),
        )),
        Some(other) => Err(GatewayError::Protocol(format!(
            "upload id field is not a string: {other}"
        ))),
    }
}

fn success_value(status: u16, body: &str) -> Result<Value, GatewayError> {
    if !(200..300).contains(&status) {
        return Err(GatewayError::Remote {
            status,
            message: error_message(status, body),
        });
    }
    serde_json::from_str(body)
        .map_err(|e| GatewayError::Protocol(format!("unparseable success body: {e}")))
}

/// Extracts a human-readable message from an error body.
///
/// Fixed precedence: a non-null `message` field, then a non-null `error`
/// field, then the HTTP status line. Non-string field values are rendered
/// as JSON so the precedence stays deterministic across shapes.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            match value.get(field) {
                Some(Value::String(text)) if !text.is_empty() => return text.clone(),
                Some(Value::Null) | Some(Value::String(_)) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    status_line(status)
}

fn status_line(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}
