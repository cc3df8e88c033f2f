use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;

use super::ProviderKind;
use crate::error::ProviderError;

/// `{"error": {"message": ..., "code": ...}}`, shared by all three providers.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

/// Send the request and return the body of a 2xx response. Anything else
/// becomes a [`ProviderError`] with a user-facing message.
pub(crate) async fn send(
    provider: ProviderKind,
    request: RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, "API request failed", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, "response could not be read", e))?;

    if !status.is_success() {
        tracing::error!("{} API error response ({}): {}", provider.short_name(), status, body);
        return Err(status_error(provider, status, &body));
    }

    Ok(body)
}

/// A request that never produced a usable response. The URL is stripped
/// because Gemini carries the API key in its query string.
pub(crate) fn transport_error(
    provider: ProviderKind,
    context: &str,
    e: reqwest::Error,
) -> ProviderError {
    ProviderError::Transport(format!(
        "{} {}: {}",
        provider.short_name(),
        context,
        e.without_url()
    ))
}

/// Build the error for a non-2xx response from the provider's error envelope.
pub(crate) fn status_error(provider: ProviderKind, status: StatusCode, body: &str) -> ProviderError {
    ProviderError::Status {
        status: status.as_u16(),
        message: error_message(provider, body),
    }
}

fn error_message(provider: ProviderKind, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);

    if let Some(message) = parsed
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .filter(|m| !m.trim().is_empty())
    {
        return message.to_string();
    }

    // Azure falls back to the error code, then to whatever text came back
    if provider == ProviderKind::Azure {
        let code = parsed.as_ref().and_then(|e| match &e.code {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });
        if let Some(code) = code {
            return code;
        }
        if !body.trim().is_empty() {
            return body.trim().to_string();
        }
    }

    fallback_message(provider)
}

pub(crate) fn fallback_message(provider: ProviderKind) -> String {
    format!("Failed to get summary from {}", provider.short_name())
}

pub(crate) fn shape_error(provider: ProviderKind) -> ProviderError {
    ProviderError::ResponseShape(format!(
        "{} API returned an unexpected response format",
        provider.short_name()
    ))
}
