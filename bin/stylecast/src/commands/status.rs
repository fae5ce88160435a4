use stylecast_core::{Config, Paths, MAX_MODEL_IMAGES};

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("stylecast status");
    println!("================");
    println!();

    let config_path = paths.config_file();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "✗ (defaults)" }
    );
    let settings_path = paths.settings_file();
    println!(
        "Settings:  {} {}",
        settings_path.display(),
        if settings_path.exists() { "✓" } else { "✗ (not found)" }
    );

    let config = Config::load(&config_path)?;
    println!("Endpoint:  {}", config.api.endpoint);
    println!(
        "Transcode: max {}px, quality {:.2}",
        config.transcode.max_dimension, config.transcode.quality
    );
    println!();

    let store = super::settings_store(&paths);
    let settings = super::load_settings(&store).await?;

    println!(
        "API key:       {}",
        if settings.has_api_key() {
            "✓ configured"
        } else {
            "✗ not set (run `stylecast config set-key <key>`)"
        }
    );
    println!(
        "Model images:  {} / {}",
        settings.model_images.len(),
        MAX_MODEL_IMAGES
    );
    println!(
        "Prompt:        {}",
        settings.prompt.as_deref().unwrap_or("(none)")
    );
    match settings.seed {
        Some(seed) => println!("Seed:          {} (pinned)", seed),
        None => println!("Seed:          random"),
    }
    println!("Output:        {}", settings.output_format.as_str());

    Ok(())
}
