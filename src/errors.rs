use thiserror::Error;

/// Defines the failures a gateway invocation can surface.
///
/// Every failure is reported exactly once per invocation, through the
/// returned `Result`. The taxonomy distinguishes where the failure happened:
/// before the wire (`Configuration`, `Validation`), on the wire (`Network`),
/// or in the provider's response (`Remote`, `Protocol`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The capability has no credential configured. Raised before any
    /// network call is attempted.
    #[error("capability not configured: {0}")]
    Configuration(String),
    /// The input failed local validation (MIME type, size, text length).
    /// Zero network calls were issued.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The request was sent but no response was received: connection
    /// failures and timeouts that elapsed before any headers arrived.
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered with a non-2xx status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code (e.g. 400, 429, 500)
        status: u16,
        /// Human-readable message extracted from the response body
        message: String,
    },
    /// A 2xx response that is missing the expected result field or cannot
    /// be parsed. Never silently treated as an empty success.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Classifies a transport-level failure from `reqwest`.
    ///
    /// Errors surfaced by `send()` carry no status code: the request never
    /// produced a response, so they are `Network`. A failure while reading
    /// the body means a partial response arrived, which is `Protocol`.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            Self::Protocol(format!("response body could not be read: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Returns `true` if the failure happened before any network call.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Validation(_))
    }
}
