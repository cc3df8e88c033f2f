use thiserror::Error;

use crate::providers::ProviderKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    ProviderConfig(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // request URLs may carry an API key
        Error::Http(e.without_url())
    }
}

/// Why the stored provider configuration cannot produce a client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No LLM provider selected. Please configure in extension settings.")]
    NoProviderSelected,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{} settings not fully configured (missing: {})", .provider.label(), .missing.join(", "))]
    IncompleteCredentials {
        provider: ProviderKind,
        missing: Vec<&'static str>,
    },
}

/// Failures of a single provider round-trip. The display text is what the
/// overlay shows to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    ResponseShape(String),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The page could not be reached through the extension messaging channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Tab {0} is not reachable (privileged page or closed tab)")]
    Unreachable(u32),

    #[error("No content script is listening in tab {0}")]
    NoContentScript(u32),
}
