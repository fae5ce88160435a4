use anyhow::bail;

use stylecast_core::{Config, KeyValueStore, Paths, MAX_MODEL_IMAGES};
use stylecast_imaging::{parse_data_url, transcode, TranscodeOptions};

pub async fn list() -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let settings = super::load_settings(&store).await?;

    if settings.model_images.is_empty() {
        println!("No model images stored. Add one with `stylecast models add <path>`.");
        return Ok(());
    }
    for (i, image) in settings.model_images.iter().enumerate() {
        let (mime, bytes) = parse_data_url(image)?;
        println!("{}. {} ({} bytes)", i + 1, mime, bytes.len());
    }
    Ok(())
}

/// Add a reference image. It goes through the same transcode as page
/// images so stored data stays within the upload bounds.
pub async fn add(path: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;

    if settings.model_images.len() >= MAX_MODEL_IMAGES {
        bail!(
            "at most {} model images can be stored; remove one first",
            MAX_MODEL_IMAGES
        );
    }

    let config = Config::load(&paths.config_file())?;
    let bytes = tokio::fs::read(path).await?;
    let opts = TranscodeOptions {
        max_dimension: config.transcode.max_dimension,
        quality: config.transcode.quality,
        ..TranscodeOptions::default()
    };
    let data_url = transcode(&bytes, &opts)?;

    settings.model_images.push(data_url);
    store.save_settings(&settings).await?;
    println!(
        "Added model image {} of {}.",
        settings.model_images.len(),
        MAX_MODEL_IMAGES
    );
    Ok(())
}

pub async fn remove(index: usize) -> anyhow::Result<()> {
    let paths = Paths::new();
    let store = super::settings_store(&paths);
    let mut settings = super::load_settings(&store).await?;

    if index == 0 || index > settings.model_images.len() {
        bail!(
            "no model image at position {} (have {})",
            index,
            settings.model_images.len()
        );
    }
    settings.model_images.remove(index - 1);
    store.save_settings(&settings).await?;
    println!("Removed. {} model image(s) remain.", settings.model_images.len());
    Ok(())
}
