pub mod config;
pub mod error;
pub mod orchestrator;
pub mod overlay;
pub mod page;
pub mod providers;
pub mod registry;
pub mod settings;

pub use config::AppConfig;
pub use error::{ChannelError, ConfigError, Error, ProviderError, Result};
pub use orchestrator::{CommandOutcome, SummarizationOrchestrator};
pub use providers::{ProviderKind, SummarizationRequest, SummarizationResult};
pub use registry::ProviderRegistry;
pub use settings::{FileSettingsStore, MemorySettingsStore, ProviderConfig, SettingsStore};
