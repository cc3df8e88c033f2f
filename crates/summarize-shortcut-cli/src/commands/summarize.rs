use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::io::AsyncReadExt;

use summarize_shortcut_core::overlay::{MemoryDom, OVERLAY_ID};
use summarize_shortcut_core::page::{LocalBrowser, OverlayUpdate, PageContext, Selection};
use summarize_shortcut_core::{
    AppConfig, CommandOutcome, FileSettingsStore, ProviderRegistry, SummarizationOrchestrator,
};

pub async fn run(
    config: &AppConfig,
    store: FileSettingsStore,
    registry: ProviderRegistry,
    text: Option<String>,
    html: bool,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    tracing::debug!(chars = text.chars().count(), "Read selection");

    let page = PageContext::new(MemoryDom::default(), config.overlay.placement)
        .with_selection(Selection::new(&text, None));
    let browser = Arc::new(LocalBrowser::new(page));
    let orchestrator = SummarizationOrchestrator::new(browser.clone(), Arc::new(store), registry);

    let update = match orchestrator.handle_summarize_command().await {
        CommandOutcome::Completed { update, .. } => update,
        CommandOutcome::NoActiveTab => bail!("No active tab"),
        CommandOutcome::SelectionUnavailable => bail!("Selection could not be read"),
    };

    let page = browser.page().await;
    let overlay = page.overlay();

    if html {
        println!("{}", overlay.dom().outer_html(OVERLAY_ID).unwrap_or_default());
        return Ok(());
    }

    println!("Overlay: {}\n", overlay.state());
    match &update {
        OverlayUpdate::Summary { text, .. } if !text.trim().is_empty() => {
            println!("{}", text.trim());
            println!("\nSummarized with {}", update.provider_label());
            Ok(())
        }
        OverlayUpdate::Summary { .. } => bail!("Failed to generate summary. Please try again."),
        OverlayUpdate::Error { message } => bail!("Failed to generate summary: {}", message),
    }
}
