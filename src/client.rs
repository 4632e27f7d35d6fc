//! The gateway client: request construction, validation, and the
//! single-shot and two-phase protocols for each capability.

use crate::config::{Capability, GatewayConfig};
use crate::errors::GatewayError;
use crate::http::chat::{ChatMessageRequest, post_chat_message};
use crate::http::upload::upload_file;
use crate::normalize;
use crate::types::{AnalysisResult, AnalysisSource};
use chrono::Utc;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::debug;

/// Timeout for single-shot completion calls.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for uploads and file-backed analysis calls.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Image types accepted for file analysis.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Size ceiling for uploaded files.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
/// Length ceiling for text-analysis input, in characters.
pub const MAX_TEXT_LEN: usize = 2000;

const IMAGE_ANALYSIS_QUERY: &str = "Analyze the nutritional content of the food in this \
     image, including calories, protein, carbohydrates, fat, and other details.";

fn text_analysis_query(text: &str) -> String {
    format!(
        "Analyze the nutritional content of the following food: {text}. Provide detailed \
         nutrition information including calories, protein, carbohydrates, fat, vitamins, \
         and minerals."
    )
}

fn user_tag(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

/// Optional progress and message hooks for a gateway invocation.
///
/// The terminal outcome is always the returned `Result`, which resolves
/// exactly once per invocation; these hooks only observe intermediate
/// state. `on_progress` fires during uploads with non-decreasing
/// percentages in `[0, 100]`; `on_message` fires once with the answer text
/// before a completion call resolves.
#[derive(Default)]
pub struct GatewayEvents<'a> {
    on_progress: Option<Box<dyn FnMut(u8) + Send + 'a>>,
    on_message: Option<Box<dyn FnMut(&str) + Send + 'a>>,
}

impl<'a> GatewayEvents<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upload-progress hook.
    #[must_use]
    pub fn on_progress(mut self, hook: impl FnMut(u8) + Send + 'a) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    /// Sets the answer hook.
    #[must_use]
    pub fn on_message(mut self, hook: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_message = Some(Box::new(hook));
        self
    }

    fn progress(&mut self, pct: u8) {
        if let Some(hook) = &mut self.on_progress {
            hook(pct);
        }
    }

    fn message(&mut self, text: &str) {
        if let Some(hook) = &mut self.on_message {
            hook(text);
        }
    }
}

impl std::fmt::Debug for GatewayEvents<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayEvents")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_message", &self.on_message.is_some())
            .finish()
    }
}

/// A file submitted for analysis.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FileInput {
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// The client issuing HTTP calls to the completion service.
///
/// Failures are intercepted at this boundary and classified into
/// [`GatewayError`]; exactly one terminal outcome is produced per
/// invocation. No retry happens here — every failure is terminal until the
/// caller acts again.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    http: ReqwestClient,
}

/// Builder for [`GatewayClient`] instances.
#[derive(Debug)]
pub struct GatewayClientBuilder {
    config: GatewayConfig,
    connect_timeout: Option<Duration>,
}

impl GatewayClientBuilder {
    /// Sets the connection timeout. Request deadlines are fixed per
    /// operation (30 s for completions, 60 s for uploads) and are not
    /// configurable here.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the `GatewayClient`.
    #[must_use]
    pub fn build(self) -> GatewayClient {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        // This should never fail with our configuration
        let http = builder.build().expect("Failed to build HTTP client");
        GatewayClient {
            config: self.config,
            http,
        }
    }
}

impl GatewayClient {
    /// Creates a client with default transport settings.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http: ReqwestClient::new(),
        }
    }

    /// Creates a builder for `GatewayClient` instances.
    #[must_use]
    pub const fn builder(config: GatewayConfig) -> GatewayClientBuilder {
        GatewayClientBuilder {
            config,
            connect_timeout: None,
        }
    }

    /// Returns the immutable per-process configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Issues a single blocking completion call for a chat capability and
    /// returns the answer text.
    ///
    /// `events.on_message` fires once with the answer before this resolves.
    ///
    /// # Errors
    ///
    /// `Configuration` if the capability has no credential (before any
    /// network call); `Network`, `Remote`, or `Protocol` per the outcome of
    /// the exchange.
    pub async fn send_completion(
        &self,
        capability: Capability,
        query: &str,
        conversation_id: &str,
        mut events: GatewayEvents<'_>,
    ) -> Result<String, GatewayError> {
        let (base_url, api_key) = self.config.credential(capability)?;
        debug!(capability = capability.name(), "sending completion");

        let request = ChatMessageRequest::blocking(query, conversation_id, user_tag("user"));
        let (status, body) =
            post_chat_message(&self.http, base_url, api_key, &request, COMPLETION_TIMEOUT)
                .await?;
        let answer = normalize::extract_answer(status, &body)?;

        events.message(&answer);
        Ok(answer)
    }

    /// Analyzes a food description with the nutrition capability.
    ///
    /// # Errors
    ///
    /// `Configuration` if the nutrition capability has no credential;
    /// `Validation` for empty input or input longer than [`MAX_TEXT_LEN`]
    /// characters — both with zero network calls issued. Otherwise as
    /// [`send_completion`](Self::send_completion).
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, GatewayError> {
        let (base_url, api_key) = self.config.credential(Capability::Nutrition)?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::Validation(
                "the food description to analyze is empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_TEXT_LEN {
            return Err(GatewayError::Validation(format!(
                "the food description exceeds {MAX_TEXT_LEN} characters"
            )));
        }

        debug!(input_len = trimmed.len(), "analyzing text");

        let request = ChatMessageRequest::blocking(
            text_analysis_query(trimmed),
            "",
            user_tag("nutrition-text-user"),
        );
        let (status, body) =
            post_chat_message(&self.http, base_url, api_key, &request, COMPLETION_TIMEOUT)
                .await?;
        let analysis = normalize::extract_answer(status, &body)?;

        Ok(AnalysisResult {
            analysis,
            source: AnalysisSource::Text {
                input: trimmed.to_string(),
            },
            timestamp: Utc::now(),
        })
    }

    /// Uploads an image and analyzes it: phase 1 obtains an upload handle,
    /// phase 2 issues a completion call referencing it.
    ///
    /// `events.on_progress` fires during phase 1 with non-decreasing
    /// percentages, reaching 100 strictly before this resolves.
    ///
    /// # Errors
    ///
    /// `Configuration` if the nutrition capability has no credential;
    /// `Validation` for a MIME type outside [`ALLOWED_IMAGE_TYPES`], an
    /// empty file, or one larger than [`MAX_FILE_SIZE`] — all with zero
    /// network calls issued. Otherwise `Network`, `Remote`, or `Protocol`
    /// per whichever phase failed.
    pub async fn upload_and_analyze(
        &self,
        file: FileInput,
        mut events: GatewayEvents<'_>,
    ) -> Result<AnalysisResult, GatewayError> {
        let (base_url, api_key) = self.config.credential(Capability::Nutrition)?;

        if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
            return Err(GatewayError::Validation(format!(
                "unsupported file type {}: only JPG, PNG, and WEBP images are accepted",
                file.mime_type
            )));
        }
        if file.data.is_empty() {
            return Err(GatewayError::Validation("the file is empty".to_string()));
        }
        if file.data.len() > MAX_FILE_SIZE {
            return Err(GatewayError::Validation(
                "the file exceeds the 10 MiB limit".to_string(),
            ));
        }

        let user = user_tag("nutrition-user");
        let file_size = file.data.len() as u64;
        debug!(file_name = %file.name, file_size, "uploading file for analysis");

        let (status, body) = upload_file(
            &self.http,
            base_url,
            api_key,
            &file.name,
            &file.mime_type,
            file.data,
            &user,
            UPLOAD_TIMEOUT,
            |pct| events.progress(pct),
        )
        .await?;
        let handle = normalize::extract_upload_id(status, &body)?;
        debug!(file_id = %handle.file_id, "upload complete, requesting analysis");

        let request =
            ChatMessageRequest::blocking(IMAGE_ANALYSIS_QUERY, "", user).with_file(&handle);
        let (status, body) =
            post_chat_message(&self.http, base_url, api_key, &request, UPLOAD_TIMEOUT).await?;
        let analysis = normalize::extract_answer(status, &body)?;

        events.message(&analysis);
        Ok(AnalysisResult {
            analysis,
            source: AnalysisSource::File {
                file_id: handle.file_id,
                file_name: file.name,
                file_size,
            },
            timestamp: Utc::now(),
        })
    }
}
