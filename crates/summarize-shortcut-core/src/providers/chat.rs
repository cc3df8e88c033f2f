//! Chat-completions wire types, shared by OpenAI and Azure OpenAI.

use serde::{Deserialize, Serialize};

use super::http::shape_error;
use super::{ProviderKind, SummarizationRequest, SYSTEM_PROMPT};
use crate::error::ProviderError;

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    /// Azure selects the model through the deployment instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub(crate) fn build_request(model: Option<&str>, request: &SummarizationRequest) -> ChatRequest {
    ChatRequest {
        model: model.map(str::to_string),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: request.prompt(),
            },
        ],
        max_tokens: request.max_tokens,
        temperature: Some(request.temperature),
    }
}

/// Pull `choices[0].message.content` out of a successful response body.
pub(crate) fn parse_response(provider: ProviderKind, body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("{} API returned non-JSON body: {}", provider.short_name(), e);
        shape_error(provider)
    })?;

    response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            tracing::error!("{} API response missing choices[0].message.content", provider.short_name());
            shape_error(provider)
        })
}
