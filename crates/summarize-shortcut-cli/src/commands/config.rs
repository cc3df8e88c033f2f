use anyhow::{bail, Result};

use summarize_shortcut_core::{
    AppConfig, FileSettingsStore, ProviderConfig, ProviderKind, ProviderRegistry, SettingsStore,
};

pub async fn show(store: &FileSettingsStore) -> Result<()> {
    let settings = store.load().await?;

    println!("Config file:   {}", AppConfig::config_path().display());
    println!("Settings file: {}\n", store.path().display());

    if settings == ProviderConfig::default() {
        println!("No settings stored yet.");
        println!("\nTo configure a provider, run:");
        println!("  summarize-shortcut config set openaiApiKey <key>");
        println!("  summarize-shortcut config select openai");
        return Ok(());
    }

    print!("{}", toml::to_string_pretty(&settings.redacted())?);
    Ok(())
}

pub async fn set(store: &FileSettingsStore, key: &str, value: &str) -> Result<()> {
    let mut settings = store.load().await?;
    settings.set(key, value)?;
    store.save(&settings).await?;

    if value.trim().is_empty() {
        println!("Cleared {}", key);
    } else {
        println!("Saved {}", key);
    }
    Ok(())
}

pub async fn select(store: &FileSettingsStore, registry: &ProviderRegistry, provider: &str) -> Result<()> {
    let kind: ProviderKind = provider.parse()?;
    let mut settings = store.load().await?;
    let credentials = settings.credentials_for(kind)?;

    println!("Verifying {} credentials...", kind.label());
    if !registry.verify_credentials(&credentials).await {
        bail!("{} credentials are not valid; settings not saved", kind.label());
    }

    settings.selected_provider = Some(kind.id().to_string());
    store.save(&settings).await?;
    println!("{} selected", kind.label());
    Ok(())
}
