use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::{self, shape_error};
use super::{ProviderClient, ProviderKind, SummarizationRequest, SummarizationResult};
use crate::error::ProviderError;

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Option<Vec<GeminiPartResponse>>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    models: Option<Vec<ModelEntry>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// A Gemini model usable for summaries, as offered in the settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

/// `gemini-pro` → `models/gemini-pro`; names with a `/` are used as given.
fn model_path(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

fn build_request(request: &SummarizationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: request.prompt(),
            }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    }
}

fn parse_response(body: &str) -> Result<String, ProviderError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|_| shape_error(ProviderKind::Gemini))?;

    response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .and_then(|p| p.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| shape_error(ProviderKind::Gemini))
}

fn parse_model_list(body: &str) -> Result<Vec<ModelInfo>, ProviderError> {
    let list: ModelList = serde_json::from_str(body)
        .map_err(|_| ProviderError::ResponseShape("No models returned from API".to_string()))?;
    let models = list
        .models
        .ok_or_else(|| ProviderError::ResponseShape("No models returned from API".to_string()))?;

    Ok(models
        .into_iter()
        .filter(|m| m.supported_generation_methods.iter().any(|s| s == GENERATE_CONTENT))
        .filter_map(|m| {
            let name = m.name?;
            let id = name.strip_prefix("models/").unwrap_or(&name).to_string();
            Some(ModelInfo {
                display_name: m.display_name.unwrap_or_else(|| id.clone()),
                description: m.description.unwrap_or_default(),
                id,
            })
        })
        .collect())
}

/// Google Gemini provider
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// `{base}/{path}?key=...`
    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ProviderError::Transport(format!("Invalid Gemini API URL: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn generate_url(&self) -> Result<Url, ProviderError> {
        self.url(&format!("{}:{}", model_path(&self.model), GENERATE_CONTENT))
    }

    async fn generate(&self, request: &SummarizationRequest) -> Result<String, ProviderError> {
        tracing::info!("Using Gemini API with model: {}", self.model);

        let url = self.generate_url()?;
        tracing::debug!("Gemini API URL (without key): {}", url.path());

        let builder = self.client.post(url).json(&build_request(request));
        let raw = http::send(ProviderKind::Gemini, builder).await?;
        parse_response(&raw)
    }

    /// Models that support content generation for this key
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let response = self
            .client
            .get(self.url("models")?)
            .send()
            .await
            .map_err(|e| http::transport_error(ProviderKind::Gemini, "API request failed", e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: "Failed to fetch models. Please check your API key.".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| http::transport_error(ProviderKind::Gemini, "response could not be read", e))?;
        parse_model_list(&body)
    }

    async fn check(&self) -> Result<bool, reqwest::Error> {
        let Ok(list_url) = self.url("models") else {
            return Ok(false);
        };
        if self.client.get(list_url).send().await?.status() != StatusCode::OK {
            return Ok(false);
        }

        let Ok(model_url) = self.url(&model_path(&self.model)) else {
            return Ok(false);
        };
        let response = self.client.get(model_url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::error!("Gemini model verification failed: {}", self.model);
            return Ok(false);
        }

        let entry: ModelEntry = match response.json().await {
            Ok(entry) => entry,
            Err(_) => return Ok(false),
        };
        Ok(entry.supported_generation_methods.iter().any(|m| m == GENERATE_CONTENT))
    }
}

#[async_trait::async_trait]
impl ProviderClient for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult {
        self.generate(request).await.into()
    }

    async fn verify(&self) -> bool {
        match self.check().await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Gemini API verification error: {}", e.without_url());
                false
            }
        }
    }
}
