use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{AppConfig, AzureVerification};
use crate::error::{ConfigError, ProviderError};
use crate::providers::{
    AzureClient, GeminiClient, ModelInfo, OpenAiClient, ProviderClient, ProviderKind,
};
use crate::settings::{ProviderConfig, ProviderCredentials};
use crate::Result;

/// Builds provider clients from stored settings
#[derive(Clone)]
pub struct ProviderRegistry {
    client: Client,
    openai_base_url: String,
    gemini_base_url: String,
    azure_verification: AzureVerification,
}

impl ProviderRegistry {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            openai_base_url: config.http.openai_base_url.clone(),
            gemini_base_url: config.http.gemini_base_url.clone(),
            azure_verification: config.verification.azure,
        })
    }

    /// Client for the selected provider, or why there is none
    pub fn resolve_active_client(
        &self,
        config: &ProviderConfig,
    ) -> std::result::Result<Arc<dyn ProviderClient>, ConfigError> {
        let credentials = config.credentials()?;
        Ok(self.client_for(&credentials))
    }

    pub fn client_for(&self, credentials: &ProviderCredentials) -> Arc<dyn ProviderClient> {
        match credentials {
            ProviderCredentials::OpenAi { api_key, model } => Arc::new(OpenAiClient::new(
                self.client.clone(),
                &self.openai_base_url,
                api_key,
                model,
            )),
            ProviderCredentials::Azure {
                api_key,
                endpoint,
                deployment,
            } => Arc::new(AzureClient::new(
                self.client.clone(),
                api_key,
                endpoint,
                deployment,
                self.azure_verification,
            )),
            ProviderCredentials::Gemini { api_key, model } => Arc::new(GeminiClient::new(
                self.client.clone(),
                &self.gemini_base_url,
                api_key,
                model,
            )),
        }
    }

    /// Live probe used when settings are saved, never on the summarize path
    pub async fn verify_credentials(&self, credentials: &ProviderCredentials) -> bool {
        let kind: ProviderKind = credentials.kind();
        let valid = self.client_for(credentials).verify().await;
        tracing::info!("{} credential verification: {}", kind.short_name(), if valid { "valid" } else { "invalid" });
        valid
    }

    /// Gemini models that support content generation for `api_key`
    pub async fn list_available_models(
        &self,
        api_key: &str,
    ) -> std::result::Result<Vec<ModelInfo>, ProviderError> {
        let gemini = GeminiClient::new(self.client.clone(), &self.gemini_base_url, api_key, "");
        let models = gemini.list_models().await?;
        tracing::info!("Fetched {} Gemini models", models.len());
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_resolve_without_selection() {
        let err = registry()
            .resolve_active_client(&ProviderConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::NoProviderSelected);
    }

    #[test]
    fn test_resolve_azure_missing_endpoint() {
        let config = ProviderConfig {
            selected_provider: Some("azure".to_string()),
            azure_api_key: Some("key".to_string()),
            azure_deployment: Some("gpt35".to_string()),
            ..Default::default()
        };

        let err = registry().resolve_active_client(&config).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::IncompleteCredentials { provider: ProviderKind::Azure, ref missing }
                if missing == &vec!["azureEndpoint"]
        ));
        assert_eq!(
            err.to_string(),
            "Azure OpenAI settings not fully configured (missing: azureEndpoint)"
        );
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let config = ProviderConfig {
            selected_provider: Some("claude".to_string()),
            ..Default::default()
        };
        let err = registry().resolve_active_client(&config).err().unwrap();
        assert_eq!(err.to_string(), "Unknown provider: claude");
    }

    #[test]
    fn test_resolve_each_provider() {
        let registry = registry();
        let configs = [
            (
                ProviderConfig {
                    selected_provider: Some("openai".to_string()),
                    openai_api_key: Some("sk".to_string()),
                    ..Default::default()
                },
                ProviderKind::OpenAi,
            ),
            (
                ProviderConfig {
                    selected_provider: Some("azure".to_string()),
                    azure_api_key: Some("key".to_string()),
                    azure_endpoint: Some("https://res.openai.azure.com".to_string()),
                    azure_deployment: Some("gpt35".to_string()),
                    ..Default::default()
                },
                ProviderKind::Azure,
            ),
            (
                ProviderConfig {
                    selected_provider: Some("gemini".to_string()),
                    gemini_api_key: Some("g".to_string()),
                    ..Default::default()
                },
                ProviderKind::Gemini,
            ),
        ];

        for (config, kind) in configs {
            let client = registry.resolve_active_client(&config).ok().unwrap();
            assert_eq!(client.kind(), kind);
        }
    }
}
