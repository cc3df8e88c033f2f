//! Provider settings: the key/value document written by the settings form
//! and read at command time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use crate::error::ConfigError;
use crate::providers::{ModelInfo, ProviderKind, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::{Error, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Stored provider configuration. Field names match the store keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
    /// Max output tokens, kept as the string the form submitted
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<String>,
    /// Last fetched Gemini model list. Kept last: TOML writes tables after values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gemini_available_models: Vec<ModelInfo>,
}

/// Hand-edited files may write numeric settings as bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
        StringOrNumber::String(s) => s,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    }))
}

/// Credentials of one provider variant, all required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCredentials {
    OpenAi {
        api_key: String,
        model: String,
    },
    Azure {
        api_key: String,
        endpoint: String,
        deployment: String,
    },
    Gemini {
        api_key: String,
        model: String,
    },
}

impl ProviderCredentials {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderCredentials::OpenAi { .. } => ProviderKind::OpenAi,
            ProviderCredentials::Azure { .. } => ProviderKind::Azure,
            ProviderCredentials::Gemini { .. } => ProviderKind::Gemini,
        }
    }
}

/// Trimmed, non-empty value of an optional field
fn filled(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ProviderConfig {
    /// Keys understood by [`ProviderConfig::set`]
    pub const KEYS: [&'static str; 10] = [
        "selectedProvider",
        "openaiApiKey",
        "openaiModel",
        "azureApiKey",
        "azureEndpoint",
        "azureDeployment",
        "geminiApiKey",
        "geminiModel",
        "maxLength",
        "temperature",
    ];

    /// Whether any provider is marked as selected
    pub fn has_provider(&self) -> bool {
        filled(&self.selected_provider).is_some()
    }

    /// The selected provider, if the stored id is known
    pub fn selected(&self) -> std::result::Result<ProviderKind, ConfigError> {
        match filled(&self.selected_provider) {
            Some(id) => id.parse(),
            None => Err(ConfigError::NoProviderSelected),
        }
    }

    /// Credentials of the selected provider
    pub fn credentials(&self) -> std::result::Result<ProviderCredentials, ConfigError> {
        self.credentials_for(self.selected()?)
    }

    /// Credentials of `kind`, failing with the store keys that are empty
    pub fn credentials_for(
        &self,
        kind: ProviderKind,
    ) -> std::result::Result<ProviderCredentials, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |value: &Option<String>, key: &'static str| {
            let v = filled(value);
            if v.is_none() {
                missing.push(key);
            }
            v.unwrap_or_default()
        };

        let credentials = match kind {
            ProviderKind::OpenAi => ProviderCredentials::OpenAi {
                api_key: require(&self.openai_api_key, "openaiApiKey"),
                model: filled(&self.openai_model).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            ProviderKind::Azure => ProviderCredentials::Azure {
                api_key: require(&self.azure_api_key, "azureApiKey"),
                endpoint: require(&self.azure_endpoint, "azureEndpoint"),
                deployment: require(&self.azure_deployment, "azureDeployment"),
            },
            ProviderKind::Gemini => ProviderCredentials::Gemini {
                api_key: require(&self.gemini_api_key, "geminiApiKey"),
                model: filled(&self.gemini_model).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
        };

        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(ConfigError::IncompleteCredentials { provider: kind, missing })
        }
    }

    /// `maxLength`, or the default when absent or unparseable
    pub fn max_tokens(&self) -> u32 {
        filled(&self.max_length)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// `temperature`, or the default when absent or unparseable
    pub fn temperature(&self) -> f32 {
        filled(&self.temperature)
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Set a value by its store key. An empty value clears the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let slot = match key {
            "selectedProvider" => {
                if let Some(id) = &value {
                    id.parse::<ProviderKind>()?;
                }
                &mut self.selected_provider
            }
            "openaiApiKey" => &mut self.openai_api_key,
            "openaiModel" => &mut self.openai_model,
            "azureApiKey" => &mut self.azure_api_key,
            "azureEndpoint" => &mut self.azure_endpoint,
            "azureDeployment" => &mut self.azure_deployment,
            "geminiApiKey" => &mut self.gemini_api_key,
            "geminiModel" => &mut self.gemini_model,
            "maxLength" => &mut self.max_length,
            "temperature" => &mut self.temperature,
            other => return Err(Error::Config(format!("Unknown settings key: {}", other))),
        };
        *slot = value;
        Ok(())
    }

    /// Copy with every credential replaced by a placeholder, for display
    pub fn redacted(&self) -> Self {
        let hide = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        Self {
            openai_api_key: hide(&self.openai_api_key),
            azure_api_key: hide(&self.azure_api_key),
            gemini_api_key: hide(&self.gemini_api_key),
            ..self.clone()
        }
    }
}

/// Read/write access to the persisted provider settings
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<ProviderConfig>;

    async fn save(&self, config: &ProviderConfig) -> Result<()>;
}

/// Settings kept in a TOML file
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<ProviderConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProviderConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, config: &ProviderConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;

        tracing::debug!("Saved provider settings to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory, for hosts without persistence and for tests
#[derive(Default)]
pub struct MemorySettingsStore {
    config: RwLock<ProviderConfig>,
}

impl MemorySettingsStore {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<ProviderConfig> {
        Ok(self.config.read().await.clone())
    }

    async fn save(&self, config: &ProviderConfig) -> Result<()> {
        *self.config.write().await = config.clone();
        Ok(())
    }
}
