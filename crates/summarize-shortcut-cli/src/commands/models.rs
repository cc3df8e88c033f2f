use anyhow::{bail, Result};

use summarize_shortcut_core::{FileSettingsStore, ProviderRegistry, SettingsStore};

pub async fn run(
    store: &FileSettingsStore,
    registry: &ProviderRegistry,
    api_key: Option<String>,
    save: bool,
) -> Result<()> {
    let mut settings = store.load().await?;

    let api_key = api_key
        .or_else(|| settings.gemini_api_key.clone())
        .filter(|k| !k.trim().is_empty());
    let Some(api_key) = api_key else {
        bail!("Please enter an API key first");
    };

    let models = registry.list_available_models(api_key.trim()).await?;

    if models.is_empty() {
        println!("No Gemini models with content generation found.");
        return Ok(());
    }

    println!("Gemini models ({}):\n", models.len());
    for model in &models {
        if model.display_name == model.id {
            println!("  {}", model.id);
        } else {
            println!("  {} - {}", model.id, model.display_name);
        }
        if !model.description.is_empty() {
            println!("    {}", model.description);
        }
    }

    if save {
        settings.gemini_available_models = models;
        store.save(&settings).await?;
        println!("\nSaved model list to {}", store.path().display());
    }

    Ok(())
}
