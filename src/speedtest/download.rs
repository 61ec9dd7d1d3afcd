use super::{ProbeMeasurement, ProbeProgress, SpeedProbe};
use crate::error::ProbeError;
use async_trait::async_trait;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Measures download throughput by streaming `<url>?bytes=<size>`.
pub struct DownloadProbe {
    client: reqwest::Client,
    url: String,
    download_size: u64,
}

impl DownloadProbe {
    pub fn new(url: impl Into<String>, download_size: u64) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            download_size,
        })
    }
}

#[async_trait]
impl SpeedProbe for DownloadProbe {
    async fn run(&self, progress_tx: mpsc::Sender<ProbeProgress>) -> Result<ProbeMeasurement, ProbeError> {
        let url = format!("{}?bytes={}", self.url, self.download_size);
        debug!(%url, "starting download probe");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }
        let mut stream = response.bytes_stream();

        let start = Instant::now();
        let mut downloaded: u64 = 0;
        let mut last_update = start;
        let mut last_downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;

            let now = Instant::now();
            let interval = now.duration_since(last_update);

            if interval >= PROGRESS_INTERVAL {
                let bytes_delta = downloaded - last_downloaded;
                let _ = progress_tx
                    .send(ProbeProgress {
                        transferred_bytes: downloaded,
                        bytes_per_sec: (bytes_delta as f64 / interval.as_secs_f64()) as u64,
                    })
                    .await;

                last_update = now;
                last_downloaded = downloaded;
            }
        }

        if downloaded == 0 {
            return Err(ProbeError::EmptyBody);
        }

        let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);
        let bytes_per_sec = ((downloaded as f64 / elapsed) as u64).max(1);
        debug!(downloaded, bytes_per_sec, "download probe finished");

        Ok(ProbeMeasurement {
            transferred_bytes: downloaded,
            bytes_per_sec,
        })
    }
}
