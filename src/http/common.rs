//! Endpoint URL construction and authentication headers.

/// Header carrying the bearer credential.
pub const AUTH_HEADER: &str = "Authorization";

/// The endpoints the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Blocking chat completion.
    ChatMessages,
    /// Phase 1 of a two-phase submission: multipart file upload.
    FileUpload,
}

impl Endpoint {
    const fn path(self) -> &'static str {
        match self {
            Self::ChatMessages => "/chat-messages",
            Self::FileUpload => "/files/upload",
        }
    }
}

/// Joins a capability's base URL and an endpoint path.
///
/// The base URL is caller-supplied (it differs per capability, and tests
/// point it at a mock server), so a trailing slash is tolerated.
#[must_use]
pub fn endpoint_url(base_url: &str, endpoint: Endpoint) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint.path())
}

/// Formats the bearer value for [`AUTH_HEADER`].
#[must_use]
pub fn bearer(api_key: &str) -> String {
    format!("Bearer {api_key}")
}
