use reqwest::Client;

use super::{chat, http, ProviderClient, ProviderKind, SummarizationRequest, SummarizationResult};
use crate::error::ProviderError;

/// OpenAI chat-completions provider
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    async fn chat(&self, request: &SummarizationRequest) -> Result<String, ProviderError> {
        tracing::info!("Using OpenAI API with model: {}", self.model);

        let body = chat::build_request(Some(&self.model), request);
        let builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let raw = http::send(ProviderKind::OpenAi, builder).await?;
        chat::parse_response(ProviderKind::OpenAi, &raw)
    }
}

#[async_trait::async_trait]
impl ProviderClient for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult {
        self.chat(request).await.into()
    }

    async fn verify(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::error!("OpenAI API verification error: {}", e.without_url());
                false
            }
        }
    }
}
