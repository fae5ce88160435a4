use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use stylecast_core::error::{Error, Result};
use stylecast_imaging::parse_data_url;

use crate::carousel::{Carousel, Slide};

/// Pause between sequential downloads so the host's download pipeline
/// is not throttled.
pub const DOWNLOAD_PACING: Duration = Duration::from_millis(500);

/// Host seam for persisting a downloaded slide (file system, browser
/// download manager, ...).
#[async_trait]
pub trait SlideSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<()>;
}

pub struct Downloader {
    http: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_slide(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return Ok(parse_data_url(url)?.1);
        }
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("failed to fetch image: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "failed to fetch image: {}",
                response.status()
            )));
        }
        Ok(response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read image: {}", e)))?
            .to_vec())
    }

    /// Download the slide the carousel currently shows. Returns the
    /// filename handed to the sink.
    pub async fn download_current(
        &self,
        carousel: &Carousel,
        sink: &dyn SlideSink,
    ) -> Result<String> {
        let (position, _) = carousel.counter();
        self.download_slide(carousel.current(), position, sink).await
    }

    /// Download every slide in order, reference included, pacing the
    /// requests to avoid host throttling.
    pub async fn download_all(
        &self,
        carousel: &Carousel,
        sink: &dyn SlideSink,
    ) -> Result<Vec<String>> {
        let mut filenames = Vec::new();
        for (index, slide) in carousel.slides().iter().enumerate() {
            if index > 0 {
                sleep(DOWNLOAD_PACING).await;
            }
            filenames.push(self.download_slide(slide, index + 1, sink).await?);
        }
        info!(count = filenames.len(), "Downloaded all slides");
        Ok(filenames)
    }

    async fn download_slide(
        &self,
        slide: &Slide,
        position: usize,
        sink: &dyn SlideSink,
    ) -> Result<String> {
        let bytes = self.fetch_slide(&slide.url).await?;
        let filename = slide_filename(slide, position);
        sink.save(&filename, &bytes).await?;
        Ok(filename)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

fn slide_filename(slide: &Slide, position: usize) -> String {
    let ts = chrono::Utc::now().timestamp_millis();
    if slide.is_reference {
        format!("stylecast-original-{}.png", ts)
    } else {
        format!("stylecast-result-{}-{}.png", position, ts)
    }
}
