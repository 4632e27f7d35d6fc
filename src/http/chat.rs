//! The blocking chat-message call shared by every capability.

use super::common::{AUTH_HEADER, Endpoint, bearer, endpoint_url};
use crate::errors::GatewayError;
use crate::types::UploadHandle;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Reference to an uploaded file, attached to a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct FileAttachment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub transfer_method: &'static str,
    pub upload_file_id: String,
}

impl FileAttachment {
    /// An image attachment referencing an upload handle.
    ///
    /// `transfer_method` is `remote_url`, matching what the service expects
    /// for ids returned by its own upload endpoint.
    #[must_use]
    pub fn image(handle: &UploadHandle) -> Self {
        Self {
            kind: "image",
            transfer_method: "remote_url",
            upload_file_id: handle.file_id.clone(),
        }
    }
}

/// Request body for `POST {base_url}/chat-messages`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageRequest {
    pub inputs: serde_json::Value,
    pub query: String,
    pub response_mode: &'static str,
    pub conversation_id: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileAttachment>>,
}

impl ChatMessageRequest {
    /// A blocking-mode request with empty inputs and no attachments.
    #[must_use]
    pub fn blocking(
        query: impl Into<String>,
        conversation_id: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            inputs: serde_json::json!({}),
            query: query.into(),
            response_mode: "blocking",
            conversation_id: conversation_id.into(),
            user: user.into(),
            files: None,
        }
    }

    /// Attaches an uploaded file, mirroring it in `inputs.file_id` the way
    /// the analysis application expects.
    #[must_use]
    pub fn with_file(mut self, handle: &UploadHandle) -> Self {
        self.inputs = serde_json::json!({ "file_id": handle.file_id });
        self.files = Some(vec![FileAttachment::image(handle)]);
        self
    }
}

/// Issues the completion call and returns the raw `(status, body)` pair for
/// the normalizer.
///
/// # Errors
///
/// `Network` if the request could not be sent or no response arrived within
/// `timeout`; `Protocol` if the response body could not be read.
pub async fn post_chat_message(
    http: &ReqwestClient,
    base_url: &str,
    api_key: &str,
    request: &ChatMessageRequest,
    timeout: Duration,
) -> Result<(u16, String), GatewayError> {
    let url = endpoint_url(base_url, Endpoint::ChatMessages);
    debug!(%url, query_len = request.query.len(), "posting chat message");

    let response = http
        .post(&url)
        .header(AUTH_HEADER, bearer(api_key))
        .json(request)
        .timeout(timeout)
        .send()
        .await
        .map_err(GatewayError::from_transport)?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(GatewayError::from_transport)?;
    debug!(status, body_len = body.len(), "chat message response");

    Ok((status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_request_serialization() {
        let request = ChatMessageRequest::blocking("Hello", "", "user-1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "Hello");
        assert_eq!(json["response_mode"], "blocking");
        assert_eq!(json["conversation_id"], "");
        assert_eq!(json["inputs"], serde_json::json!({}));
        assert!(json.get("files").is_none());
    }

    #[test]
    fn test_with_file_sets_inputs_and_attachment() {
        let handle = UploadHandle {
            file_id: "file-123".to_string(),
        };
        let request = ChatMessageRequest::blocking("Analyze", "", "user-1").with_file(&handle);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"]["file_id"], "file-123");
        assert_eq!(json["files"][0]["type"], "image");
        assert_eq!(json["files"][0]["transfer_method"], "remote_url");
        assert_eq!(json["files"][0]["upload_file_id"], "file-123");
    }
}
