use crate::errors::GatewayError;

/// Default base URL for the hosted Dify API.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// The capabilities the gateway can address. Each one maps to its own
/// Dify application, with its own base URL and credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// General recipe/diet chat.
    Chat,
    /// The nutrition assistant conversation.
    Assistant,
    /// Nutrition analysis of images and food descriptions.
    Nutrition,
}

impl Capability {
    /// Stable lowercase name, used in error messages and env var lookup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Assistant => "assistant",
            Self::Nutrition => "nutrition",
        }
    }
}

/// Endpoint and credential for a single capability.
///
/// A capability with no API key is permanently disabled: its first use
/// surfaces [`GatewayError::Configuration`] without touching the network.
#[derive(Debug, Clone)]
pub struct CapabilityConfig {
    /// Base URL of the Dify application, without a trailing path.
    pub base_url: String,
    /// Bearer credential, or `None` if the capability is disabled.
    pub api_key: Option<String>,
}

impl CapabilityConfig {
    /// Creates a capability configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// A permanently disabled capability pointing at the default base URL.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(DEFAULT_BASE_URL, None)
    }

    fn from_env(url_var: &str, key_var: &str) -> Self {
        let base_url =
            std::env::var(url_var).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var(key_var).ok().filter(|k| !k.is_empty());
        Self { base_url, api_key }
    }
}

/// Immutable per-process gateway configuration.
///
/// Resolved once at startup and passed to every operation; there are no
/// module-level singletons to mutate.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    chat: CapabilityConfig,
    assistant: CapabilityConfig,
    nutrition: CapabilityConfig,
}

impl GatewayConfig {
    /// Creates a configuration from explicit per-capability settings.
    #[must_use]
    pub const fn new(
        chat: CapabilityConfig,
        assistant: CapabilityConfig,
        nutrition: CapabilityConfig,
    ) -> Self {
        Self {
            chat,
            assistant,
            nutrition,
        }
    }

    /// Resolves the configuration from the environment.
    ///
    /// Reads `DIFY_{CHAT,ASSISTANT,NUTRITION}_API_URL` and the matching
    /// `_API_KEY` variables. A missing or empty key leaves that capability
    /// disabled; a missing URL falls back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            chat: CapabilityConfig::from_env("DIFY_CHAT_API_URL", "DIFY_CHAT_API_KEY"),
            assistant: CapabilityConfig::from_env(
                "DIFY_ASSISTANT_API_URL",
                "DIFY_ASSISTANT_API_KEY",
            ),
            nutrition: CapabilityConfig::from_env(
                "DIFY_NUTRITION_API_URL",
                "DIFY_NUTRITION_API_KEY",
            ),
        }
    }

    /// Returns the configuration for a capability.
    #[must_use]
    pub const fn capability(&self, capability: Capability) -> &CapabilityConfig {
        match capability {
            Capability::Chat => &self.chat,
            Capability::Assistant => &self.assistant,
            Capability::Nutrition => &self.nutrition,
        }
    }

    /// Returns the base URL and credential for a capability, or
    /// `Configuration` if the capability is disabled.
    pub(crate) fn credential(
        &self,
        capability: Capability,
    ) -> Result<(&str, &str), GatewayError> {
        let config = self.capability(capability);
        match config.api_key.as_deref() {
            Some(key) => Ok((&config.base_url, key)),
            None => Err(GatewayError::Configuration(format!(
                "no API key configured for the {} capability",
                capability.name()
            ))),
        }
    }
}
