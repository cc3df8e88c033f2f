use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::page::{BrowserHost, OverlayCall, OverlayUpdate, PageRequest, PageResponse, Selection};
use crate::providers::{SummarizationRequest, SummarizationResult};
use crate::registry::ProviderRegistry;
use crate::settings::{ProviderConfig, SettingsStore};

/// Name of the keyboard command that triggers a summary
pub const COMMAND_NAME: &str = "summarize-text";

pub const NO_SELECTION_MESSAGE: &str = "No text selected to summarize.";

/// How one command invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// No focused tab; nothing was shown
    NoActiveTab,
    /// The content script could not be reached; nothing was shown
    SelectionUnavailable,
    /// The flow ran to the end. `delivered` is false if the final overlay
    /// update could not be injected.
    Completed {
        update: OverlayUpdate,
        delivered: bool,
    },
}

/// Runs the summarize command: read the selection, show the overlay,
/// call the provider and hand the outcome back to the page.
pub struct SummarizationOrchestrator<H: BrowserHost, S: SettingsStore> {
    host: Arc<H>,
    store: Arc<S>,
    registry: ProviderRegistry,
}

impl<H: BrowserHost, S: SettingsStore> SummarizationOrchestrator<H, S> {
    pub fn new(host: Arc<H>, store: Arc<S>, registry: ProviderRegistry) -> Self {
        Self {
            host,
            store,
            registry,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Entry point for browser commands; anything but [`COMMAND_NAME`] is ignored.
    pub async fn handle_command(&self, name: &str) -> Option<CommandOutcome> {
        if name != COMMAND_NAME {
            debug!("Ignoring command: {}", name);
            return None;
        }
        Some(self.handle_summarize_command().await)
    }

    pub async fn handle_summarize_command(&self) -> CommandOutcome {
        let span = info_span!("command", command = COMMAND_NAME, id = %Uuid::new_v4());
        self.run().instrument(span).await
    }

    async fn run(&self) -> CommandOutcome {
        info!("Handling summarize command");

        let Some(tab) = self.host.active_tab().await else {
            error!("No active tab found");
            return CommandOutcome::NoActiveTab;
        };
        debug!(tab, "Active tab found");

        let settings = match self.store.load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load provider settings, continuing without: {}", e);
                ProviderConfig::default()
            }
        };
        info!(
            provider = settings.selected_provider.as_deref().unwrap_or("none"),
            "Provider settings loaded"
        );

        let selection = match self.host.send_message(tab, PageRequest::GetSelectedText).await {
            Ok(PageResponse::Selection(selection)) => Selection::new(selection.text, selection.rect),
            Ok(other) => {
                error!(?other, "Unexpected reply to selection request");
                return CommandOutcome::SelectionUnavailable;
            }
            Err(e) => {
                error!("Failed to get selection from content script: {}", e);
                return CommandOutcome::SelectionUnavailable;
            }
        };
        debug!(text_len = selection.text.chars().count(), "Selection retrieved");

        let show = OverlayCall::ShowLoading {
            selected_text: selection.text.clone(),
            rect: selection.rect,
            has_provider: settings.has_provider(),
        };
        if let Err(e) = self.host.execute(tab, show).await {
            warn!("Failed to show loading overlay: {}", e);
        }

        let update = self.summarize(&settings, &selection.text).await;

        let apply = OverlayCall::ApplyResult {
            update: update.clone(),
        };
        let delivered = match self.host.execute(tab, apply).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to update overlay with result: {}", e);
                false
            }
        };

        CommandOutcome::Completed { update, delivered }
    }

    async fn summarize(&self, settings: &ProviderConfig, text: &str) -> OverlayUpdate {
        if !settings.has_provider() {
            return OverlayUpdate::Error {
                message: ConfigError::NoProviderSelected.to_string(),
            };
        }
        if text.is_empty() {
            return OverlayUpdate::Error {
                message: NO_SELECTION_MESSAGE.to_string(),
            };
        }

        let client = match self.registry.resolve_active_client(settings) {
            Ok(client) => client,
            Err(e) => {
                warn!("Cannot build provider client: {}", e);
                return OverlayUpdate::Error {
                    message: e.to_string(),
                };
            }
        };

        let kind = client.kind();
        let request = SummarizationRequest::new(text, settings.max_tokens(), settings.temperature());
        info!(provider = %kind, max_tokens = request.max_tokens, "Requesting summary");

        match client.summarize(&request).await {
            SummarizationResult::Success { summary_text } => {
                info!(len = summary_text.chars().count(), "Summary received");
                OverlayUpdate::Summary {
                    text: summary_text,
                    provider: Some(kind),
                }
            }
            SummarizationResult::Failure { message } => {
                error!("Error getting summary: {}", message);
                OverlayUpdate::Error { message }
            }
        }
    }
}
