//! Wire-level plumbing for the completion service: endpoint construction,
//! the blocking chat-message call, and the multipart file upload.

pub mod chat;
pub mod common;
pub mod upload;
