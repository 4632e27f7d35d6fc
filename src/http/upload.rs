//! Multipart file upload with upload-progress reporting.
//!
//! The file bytes are wrapped in a chunked body stream that reports a
//! percentage through a channel as each chunk is handed to the transport.
//! The caller drains that channel concurrently with the request, so the
//! progress hook fires while the upload is actually in flight, and 100 is
//! always observed before the call returns success.

use super::common::{AUTH_HEADER, Endpoint, bearer, endpoint_url};
use crate::errors::GatewayError;
use async_stream::stream;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::Client as ReqwestClient;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Upload bodies are streamed in chunks of this size so progress moves in
/// visible steps rather than one 0-to-100 jump.
const PROGRESS_CHUNK: usize = 64 * 1024;

fn progress_body(
    data: Vec<u8>,
    progress: mpsc::UnboundedSender<u8>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    stream! {
        let bytes = Bytes::from(data);
        let total = bytes.len().max(1);
        let mut sent = 0usize;
        let _ = progress.send(0);
        let mut offset = 0usize;
        while offset < bytes.len() {
            let end = (offset + PROGRESS_CHUNK).min(bytes.len());
            let chunk = bytes.slice(offset..end);
            sent += chunk.len();
            offset = end;
            // sent never exceeds total, so the percentage stays in [0, 100]
            // and is non-decreasing
            let pct = (sent * 100 / total) as u8;
            let _ = progress.send(pct);
            yield Ok(chunk);
        }
    }
}

/// Uploads a file as `POST {base_url}/files/upload`, multipart with a `file`
/// part and a `user` field, and returns the raw `(status, body)` pair for
/// the normalizer.
///
/// `on_progress` is invoked with monotonically non-decreasing percentages in
/// `[0, 100]`; 100 fires before this function returns a response.
///
/// # Errors
///
/// `Validation` if the MIME string cannot form a part header; `Network` if
/// the request could not be sent or timed out before headers; `Protocol` if
/// the response body could not be read.
pub async fn upload_file(
    http: &ReqwestClient,
    base_url: &str,
    api_key: &str,
    file_name: &str,
    mime_type: &str,
    data: Vec<u8>,
    user: &str,
    timeout: Duration,
    mut on_progress: impl FnMut(u8),
) -> Result<(u16, String), GatewayError> {
    let url = endpoint_url(base_url, Endpoint::FileUpload);
    debug!(%url, file_name, mime_type, size = data.len(), "uploading file");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let body = reqwest::Body::wrap_stream(progress_body(data, tx));
    let part = Part::stream(body)
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .map_err(|e| GatewayError::Validation(format!("invalid MIME type: {e}")))?;
    let form = Form::new().part("file", part).text("user", user.to_string());

    let send = http
        .post(&url)
        .header(AUTH_HEADER, bearer(api_key))
        .multipart(form)
        .timeout(timeout)
        .send();
    tokio::pin!(send);

    let mut progress_open = true;
    let response = loop {
        tokio::select! {
            received = rx.recv(), if progress_open => {
                match received {
                    Some(pct) => on_progress(pct),
                    None => progress_open = false,
                }
            }
            result = &mut send => break result.map_err(GatewayError::from_transport)?,
        }
    };

    // The body was consumed by the time a response exists; flush whatever
    // the select loop had not drained yet.
    while let Ok(pct) = rx.try_recv() {
        on_progress(pct);
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(GatewayError::from_transport)?;
    debug!(status, body_len = body.len(), "upload response");

    Ok((status, body))
}
