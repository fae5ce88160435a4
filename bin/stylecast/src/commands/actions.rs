use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use tracing::info;

use stylecast_client::{ActionRunner, ApiClient};
use stylecast_core::{ActionKind, Config, Paths, PushEvent, UiBus};
use stylecast_imaging::{encode_data_url, sniff_mime, TranscodeOptions};
use stylecast_overlay::{Carousel, Downloader, SlideSink};

/// Saves slides under the downloads directory.
struct DirSink {
    dir: PathBuf,
}

#[async_trait]
impl SlideSink for DirSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> stylecast_core::Result<()> {
        tokio::fs::write(self.dir.join(filename), bytes).await?;
        Ok(())
    }
}

/// Turn the CLI image argument into something the job client accepts:
/// local files become data URLs, URLs pass through.
async fn resolve_source(image: &str) -> anyhow::Result<String> {
    if image.starts_with("http://") || image.starts_with("https://") || image.starts_with("data:")
    {
        return Ok(image.to_string());
    }
    let bytes = tokio::fs::read(image).await?;
    Ok(encode_data_url(sniff_mime(&bytes), &bytes))
}

pub async fn run(kind: ActionKind, image: &str, download: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load(&paths.config_file())?;
    let store = super::settings_store(&paths);
    let settings = super::load_settings(&store).await?;

    let api = ApiClient::new(
        &config.api.endpoint,
        settings.api_key.as_deref().unwrap_or(""),
        Duration::from_secs(config.api.request_timeout_secs),
    );
    let (push_tx, mut push_rx) = UiBus::new(16).split();
    let runner = ActionRunner::new(Arc::new(api), Arc::new(store), push_tx).with_transcode(
        TranscodeOptions {
            max_dimension: config.transcode.max_dimension,
            quality: config.transcode.quality,
            ..TranscodeOptions::default()
        },
    );

    let source = resolve_source(image).await?;
    let ack = match kind {
        ActionKind::TryOn => runner.try_on(&source).await?,
        ActionKind::ModelSwap => runner.model_swap(&source).await?,
        ActionKind::ModelVariation => runner.model_variation(&source).await?,
    };
    info!(kind = kind.as_str(), jobs = ack.job_ids.len(), "Jobs submitted");
    println!("Submitted {} job(s), waiting for results...", ack.job_ids.len());

    let Some(event) = push_rx.recv().await else {
        bail!("job client stopped before delivering a result");
    };
    match event {
        PushEvent::ActionCompleted { outputs, .. } => {
            println!("Completed with {} result(s):", outputs.len());
            for (i, output) in outputs.iter().enumerate() {
                if output.starts_with("data:") {
                    println!("  {}. <data URL, {} chars>", i + 1, output.len());
                } else {
                    println!("  {}. {}", i + 1, output);
                }
            }
            if download {
                let dir = paths.downloads_dir();
                tokio::fs::create_dir_all(&dir).await?;
                let carousel = Carousel::new(outputs, Some(source));
                let sink = DirSink { dir: dir.clone() };
                let filenames = Downloader::new().download_all(&carousel, &sink).await?;
                println!("Saved {} file(s) to {}", filenames.len(), dir.display());
            }
        }
        PushEvent::ActionFailed { error, .. } => {
            bail!("{}", error);
        }
    }
    Ok(())
}
