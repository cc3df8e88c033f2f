mod azure;
mod chat;
mod gemini;
mod http;
mod openai;

pub use azure::AzureClient;
pub use gemini::{GeminiClient, ModelInfo};
pub use openai::OpenAiClient;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProviderError};

/// Selected text longer than this is cut before it is sent.
pub const MAX_INPUT_CHARS: usize = 4000;
/// Appended to text that was cut at [`MAX_INPUT_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes text concisely and accurately.";
pub(crate) const USER_PROMPT_PREFIX: &str =
    "Summarize the following text in a concise way. Focus on the key points and important details only:\n\n";

pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Cut `input` to [`MAX_INPUT_CHARS`] characters, marking the cut.
pub fn truncate_for_request(input: &str) -> Cow<'_, str> {
    match input.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => Cow::Owned(format!("{}{}", &input[..idx], TRUNCATION_MARKER)),
        None => Cow::Borrowed(input),
    }
}

/// The remote LLM services a summary can be requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::Azure, ProviderKind::Gemini];

    /// Identifier stored under `selectedProvider`
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Azure => "azure",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Label shown in the overlay footer
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Azure => "Azure OpenAI",
            ProviderKind::Gemini => "Google Gemini",
        }
    }

    /// Short name used in log lines and error messages
    pub fn short_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Azure => "Azure",
            ProviderKind::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" => Ok(ProviderKind::Azure),
            "gemini" => Ok(ProviderKind::Gemini),
            "" => Err(ConfigError::NoProviderSelected),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// One summarization call, owned by the orchestrator for a single command.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizationRequest {
    pub text: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl SummarizationRequest {
    /// Build a request, forcing `max_tokens >= 1` and `temperature` into `[0, 2]`.
    pub fn new(text: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        let temperature = if temperature.is_finite() {
            temperature.clamp(0.0, MAX_TEMPERATURE)
        } else {
            DEFAULT_TEMPERATURE
        };

        Self {
            text: text.into(),
            max_tokens: max_tokens.max(1),
            temperature,
        }
    }

    /// User prompt with the (possibly truncated) text appended
    pub fn prompt(&self) -> String {
        format!("{}{}", USER_PROMPT_PREFIX, truncate_for_request(&self.text))
    }
}

/// Outcome of exactly one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizationResult {
    Success { summary_text: String },
    Failure { message: String },
}

impl SummarizationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SummarizationResult::Success { .. })
    }
}

impl From<Result<String, ProviderError>> for SummarizationResult {
    fn from(result: Result<String, ProviderError>) -> Self {
        match result {
            Ok(summary_text) => SummarizationResult::Success { summary_text },
            Err(e) => SummarizationResult::Failure { message: e.to_string() },
        }
    }
}

/// A provider that can turn a [`SummarizationRequest`] into a summary
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Single round-trip, no retries. Every failure comes back as
    /// [`SummarizationResult::Failure`].
    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult;

    /// Lightweight live probe of the credentials. Advisory only.
    async fn verify(&self) -> bool;
}
