use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// Content kind of a message. Only text today; the variant exists so the
/// log format does not change when richer kinds are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
}

/// One entry in the conversation log.
///
/// A user message is created frozen. An AI message starts as an empty
/// streaming placeholder, accumulates content while the exchange is in
/// flight, and is frozen on completion or failure. Once `is_streaming` is
/// `false` the message is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Strictly increasing with insertion order within a session.
    pub id: u64,
    pub content: String,
    pub sender: Sender,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub is_streaming: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A frozen user message.
    #[must_use]
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::User,
            kind: MessageKind::Text,
            is_streaming: false,
            timestamp: Utc::now(),
        }
    }

    /// An empty AI placeholder with `is_streaming = true`.
    #[must_use]
    pub fn placeholder(id: u64) -> Self {
        Self {
            id,
            content: String::new(),
            sender: Sender::Ai,
            kind: MessageKind::Text,
            is_streaming: true,
            timestamp: Utc::now(),
        }
    }

    /// A frozen AI message, used for seeded greetings.
    #[must_use]
    pub fn ai(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::Ai,
            kind: MessageKind::Text,
            is_streaming: false,
            timestamp: Utc::now(),
        }
    }
}

/// A session identifier plus its ordered message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: String,
    pub messages: Vec<Message>,
}

/// What a nutrition analysis was performed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AnalysisSource {
    /// An uploaded file, referenced by the provider-issued file id.
    File {
        file_id: String,
        file_name: String,
        file_size: u64,
    },
    /// A raw text description.
    Text { input: String },
}

/// Outcome of a nutrition submission, as stored in the analysis history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The analysis text returned by the completion service.
    pub analysis: String,
    #[serde(flatten)]
    pub source: AnalysisSource,
    pub timestamp: DateTime<Utc>,
}

/// Result of phase 1 of a two-phase submission: an opaque provider file id
/// that phase 2 references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub file_id: String,
}
