use anyhow::{bail, Result};

use summarize_shortcut_core::{FileSettingsStore, ProviderRegistry, SettingsStore};

pub async fn run(store: &FileSettingsStore, registry: &ProviderRegistry) -> Result<()> {
    let settings = store.load().await?;
    let credentials = settings.credentials()?;
    let label = credentials.kind().label();

    if registry.verify_credentials(&credentials).await {
        println!("{}: credentials valid", label);
        Ok(())
    } else {
        bail!("{}: credentials invalid", label)
    }
}
