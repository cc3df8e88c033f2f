use reqwest::{Client, StatusCode};

use super::chat::{self, ChatMessage, ChatRequest};
use super::{http, ProviderClient, ProviderKind, SummarizationRequest, SummarizationResult};
use crate::config::AzureVerification;
use crate::error::ProviderError;

pub const AZURE_API_VERSION: &str = "2023-05-15";

/// Azure OpenAI provider, addressed by resource endpoint and deployment
pub struct AzureClient {
    client: Client,
    api_key: String,
    endpoint: String,
    deployment: String,
    verification: AzureVerification,
}

impl AzureClient {
    pub fn new(
        client: Client,
        api_key: &str,
        endpoint: &str,
        deployment: &str,
        verification: AzureVerification,
    ) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            deployment: deployment.trim().to_string(),
            verification,
        }
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, AZURE_API_VERSION
        )
    }

    async fn chat(&self, request: &SummarizationRequest) -> Result<String, ProviderError> {
        tracing::info!("Using Azure OpenAI API with deployment: {}", self.deployment);

        let url = self.completions_url();
        tracing::debug!("Azure API URL (without key): {}", url);

        let body = chat::build_request(None, request);
        let builder = self
            .client
            .post(url)
            .header("api-key", &self.api_key)
            .json(&body);

        let raw = http::send(ProviderKind::Azure, builder).await?;
        chat::parse_response(ProviderKind::Azure, &raw)
    }
}

/// Whether a non-2xx verification reply still proves the deployment is reachable.
fn verification_accepts(status: StatusCode, body: &str) -> bool {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => false,
        s if s.is_success() => true,
        // Permission or quota problems mean the key and deployment exist
        _ => body.contains("permission") || body.contains("quota"),
    }
}

#[async_trait::async_trait]
impl ProviderClient for AzureClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult {
        self.chat(request).await.into()
    }

    async fn verify(&self) -> bool {
        let probe = ChatRequest {
            model: None,
            messages: vec![ChatMessage {
                role: "user",
                content: "Hello".to_string(),
            }],
            max_tokens: 5,
            temperature: None,
        };

        let result = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&probe)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let accept = self.verification == AzureVerification::Lenient;
                tracing::warn!(
                    "Azure API verification network error: {} (accepting: {})",
                    e.without_url(),
                    accept
                );
                return accept;
            }
        };

        let status = response.status();
        tracing::info!("Azure API verification status: {}", status);
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!("Azure API key is invalid");
        } else if status == StatusCode::NOT_FOUND {
            tracing::error!("Azure deployment not found: {}", self.deployment);
        }

        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };

        verification_accepts(status, &body)
    }
}
