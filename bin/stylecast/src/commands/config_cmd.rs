use anyhow::bail;

use stylecast_core::{Config, KeyValueStore, OutputFormat, Paths};

/// Show the effective configuration and settings as pretty JSON. The API
/// key is redacted.
pub async fn show() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load(&paths.config_file())?;

    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;
    if settings.has_api_key() {
        settings.api_key = Some("<redacted>".to_string());
    }

    println!("Config ({}):", paths.config_file().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();
    println!("Settings ({}):", paths.settings_file().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub async fn set_key(key: &str) -> anyhow::Result<()> {
    if key.trim().is_empty() {
        bail!("API key must not be blank");
    }
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;
    settings.api_key = Some(key.trim().to_string());
    store.save_settings(&settings).await?;
    println!("API key saved.");
    Ok(())
}

pub async fn set_endpoint(endpoint: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let mut config = Config::load(&paths.config_file())?;
    config.api.endpoint = endpoint.trim_end_matches('/').to_string();
    config.save(&paths.config_file())?;
    println!("Endpoint set to {}", config.api.endpoint);
    Ok(())
}

pub async fn set_prompt(prompt: Option<String>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;
    match prompt {
        Some(text) if !text.trim().is_empty() => {
            settings.prompt = Some(text);
            println!("Prompt saved.");
        }
        _ => {
            settings.prompt = None;
            println!("Prompt cleared.");
        }
    }
    store.save_settings(&settings).await?;
    Ok(())
}

pub async fn set_seed(seed: Option<u64>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;
    settings.seed = seed;
    store.save_settings(&settings).await?;
    match seed {
        Some(value) => println!("Seed pinned to {}.", value),
        None => println!("Seed cleared; the service will randomize."),
    }
    Ok(())
}

pub async fn set_format(format: &str) -> anyhow::Result<()> {
    let parsed = match format.to_ascii_lowercase().as_str() {
        "png" => OutputFormat::Png,
        "jpeg" | "jpg" => OutputFormat::Jpeg,
        other => bail!("unknown output format '{}' (expected png or jpeg)", other),
    };
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;
    settings.output_format = parsed;
    store.save_settings(&settings).await?;
    println!("Output format set to {}.", parsed.as_str());
    Ok(())
}
