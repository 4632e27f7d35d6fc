//! Async client for Dify-style generative-AI completion services.
//!
//! This crate turns one caller action — sending a chat message, or submitting
//! a file or text description for nutrition analysis — into the HTTP call(s)
//! it requires, normalizes the service's heterogeneous success/error payload
//! shapes into a canonical outcome, and feeds the result into a conversation
//! log or a bounded analysis history.
//!
//! # Overview
//!
//! - [`GatewayClient`] builds and issues the HTTP calls for each capability:
//!   single-shot chat completions, text analysis, and the two-phase
//!   upload-then-complete flow for file analysis.
//! - [`normalize`] maps provider payloads into either the extracted result
//!   text or a classified [`GatewayError`].
//! - [`ConversationStore`] is an ordered message log with exactly one mutable
//!   in-flight slot, driven by gateway outcomes.
//! - [`AnalysisHistory`] is a bounded, newest-first append log for completed
//!   analyses over a pluggable string-keyed store.
//!
//! # Example
//!
//! ```no_run
//! use dify_gateway::{Capability, ConversationStore, GatewayClient, GatewayConfig};
//!
//! # async fn example() -> Result<(), dify_gateway::GatewayError> {
//! let client = GatewayClient::new(GatewayConfig::from_env());
//! let mut store = ConversationStore::new();
//!
//! store
//!     .send_message(&client, Capability::Chat, "How much protein in an egg?")
//!     .await?;
//!
//! if let Some(reply) = store.last_message() {
//!     println!("{}", reply.content);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every failure is terminal for that invocation; no retry happens anywhere
//! in the crate. A new explicit caller action is required to try again.

pub mod client;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod history;
pub mod http;
pub mod normalize;
pub mod types;

pub use client::{FileInput, GatewayClient, GatewayClientBuilder, GatewayEvents};
pub use config::{Capability, CapabilityConfig, GatewayConfig};
pub use conversation::{APOLOGY, ConversationStore};
pub use errors::GatewayError;
pub use history::{AnalysisHistory, KeyValueStore, MemoryStore};
pub use types::{
    AnalysisResult, AnalysisSource, ConversationSession, Message, MessageKind, Sender,
    UploadHandle,
};

#[cfg(test)]
mod gateway_tests;
