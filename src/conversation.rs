//! The conversation state machine: an ordered message log with exactly one
//! mutable in-flight slot.
//!
//! Per session the log moves `Idle → Sending → Streaming → Completed` or
//! `→ Failed`. The user message is frozen the moment it is appended; the AI
//! placeholder appended next to it is the only entry that may be mutated,
//! and only until it is frozen by completion or failure.

use crate::client::{GatewayClient, GatewayEvents};
use crate::config::Capability;
use crate::errors::GatewayError;
use crate::types::{AnalysisResult, ConversationSession, Message, Sender};
use chrono::Utc;
use tracing::warn;

/// Fixed content of a failed exchange's AI message.
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

const ASSISTANT_GREETING: &str = "Hello! I'm your nutrition assistant. I can answer \
     questions about nutrition and help you plan your meals. Ask me anything!";

const ASSISTANT_GREETING_WITH_CONTEXT: &str = "Hello! I'm your nutrition assistant. I've \
     reviewed your analysis result and can offer personalized advice. You can ask me how to \
     improve your nutrition balance, which ingredients to prefer, what to watch out for in \
     your diet, or which supplements might help.";

fn fresh_session_id() -> String {
    format!("conv-{}", Utc::now().timestamp_millis())
}

/// An ordered message log driven by gateway outcomes.
///
/// The store is mutated only by the single task that holds the in-flight
/// slot, so it needs no locking. At most one gateway invocation may be in
/// flight per session; issuing a second concurrent send for the same
/// session is a caller contract violation.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    session: ConversationSession,
    next_id: u64,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// An empty store with a fresh session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: ConversationSession {
                id: fresh_session_id(),
                messages: Vec::new(),
            },
            next_id: 1,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.session.messages
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.session.messages.last()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.session.messages.len()
    }

    #[must_use]
    pub fn has_messages(&self) -> bool {
        !self.session.messages.is_empty()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends the frozen user message and the streaming AI placeholder,
    /// moving the session from `Idle` to `Sending`.
    pub fn begin_exchange(&mut self, content: &str) {
        debug_assert!(
            !self.last_message().is_some_and(|m| m.is_streaming),
            "an exchange is already in flight for this session"
        );
        let user_id = self.allocate_id();
        self.session.messages.push(Message::user(user_id, content));
        let placeholder_id = self.allocate_id();
        self.session.messages.push(Message::placeholder(placeholder_id));
    }

    /// Accumulates answer content on the in-flight placeholder.
    ///
    /// A chunk arriving with no placeholder in flight is dropped with a
    /// warning; prior entries are never mutated.
    pub fn append_chunk(&mut self, chunk: &str) {
        match self.session.messages.last_mut() {
            Some(last) if last.sender == Sender::Ai && last.is_streaming => {
                last.content.push_str(chunk);
            }
            _ => warn!("dropping answer chunk: no exchange in flight"),
        }
    }

    /// Freezes the in-flight placeholder, moving to `Completed`.
    pub fn complete_exchange(&mut self) {
        if let Some(last) = self.session.messages.last_mut()
            && last.sender == Sender::Ai
            && last.is_streaming
        {
            last.is_streaming = false;
        }
    }

    /// Replaces the in-flight placeholder's content with [`APOLOGY`] and
    /// freezes it, moving to `Failed`.
    pub fn fail_exchange(&mut self) {
        if let Some(last) = self.session.messages.last_mut()
            && last.sender == Sender::Ai
            && last.is_streaming
        {
            last.content = APOLOGY.to_string();
            last.is_streaming = false;
        }
    }

    /// Atomically empties the log and resets the session identifier.
    pub fn clear(&mut self) {
        self.session.messages.clear();
        self.session.id = fresh_session_id();
        self.next_id = 1;
    }

    /// Seeds a cleared session with the assistant greeting, the richer
    /// variant when an analysis result is supplied as context.
    pub fn start_assistant_session(&mut self, context: Option<&AnalysisResult>) -> &Message {
        self.clear();
        let greeting = if context.is_some() {
            ASSISTANT_GREETING_WITH_CONTEXT
        } else {
            ASSISTANT_GREETING
        };
        let id = self.allocate_id();
        self.session.messages.push(Message::ai(id, greeting));
        self.session
            .messages
            .last()
            .expect("greeting was just appended")
    }

    /// Runs one full exchange: appends the user message and placeholder,
    /// issues the completion call, and freezes the placeholder with the
    /// answer or with [`APOLOGY`].
    ///
    /// # Errors
    ///
    /// Propagates the gateway's classification. The log always ends the
    /// call in a frozen state: `Completed` on `Ok`, `Failed` on `Err`.
    pub async fn send_message(
        &mut self,
        client: &GatewayClient,
        capability: Capability,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.begin_exchange(content);
        match client
            .send_completion(capability, content, "", GatewayEvents::new())
            .await
        {
            Ok(answer) => {
                self.append_chunk(&answer);
                self.complete_exchange();
                Ok(())
            }
            Err(err) => {
                self.fail_exchange();
                Err(err)
            }
        }
    }
}
