//! HTTP speed-test provider
//!
//! Talks to an endpoint pair shaped like `speed.cloudflare.com`:
//! `GET <download_url>?bytes=N` streams N bytes back and
//! `POST <upload_url>` accepts an arbitrary body.

use crate::{
    error::{AppError, MeasurementError, Result},
    models::{Measurement, ProviderSettings},
    provider::MeasurementProvider,
};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    Body, Client, Response, Url,
};
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("isp-service-checker/", env!("CARGO_PKG_VERSION"));

/// Connection setup bound, independent of the whole-test timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upload bodies are streamed as repeats of this zero-filled block
const UPLOAD_CHUNK: usize = 64 * 1024;
static ZEROS: [u8; UPLOAD_CHUNK] = [0; UPLOAD_CHUNK];

/// Provider measuring throughput with plain HTTP transfers
pub struct HttpSpeedProvider {
    client: Client,
    settings: ProviderSettings,
    download_url: Url,
    upload_url: Url,
}

impl HttpSpeedProvider {
    /// Create a provider from validated settings
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let download_url = Url::parse(&settings.download_url)?;
        let upload_url = Url::parse(&settings.upload_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout()))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            settings,
            download_url,
            upload_url,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Download URL with the `bytes` query parameter appended
    fn sized_download_url(&self, bytes: u64) -> Url {
        let mut url = self.download_url.clone();
        url.query_pairs_mut().append_pair("bytes", &bytes.to_string());
        url
    }

    /// Average time-to-headers of `ping_samples` zero-byte requests, in ms
    async fn measure_ping(&self) -> std::result::Result<f64, MeasurementError> {
        let url = self.sized_download_url(0);

        // Warm-up request so TCP/TLS setup is not counted as latency
        let warmup = self.send_get("ping", url.clone()).await?;
        let _ = warmup.bytes().await;

        let mut total = Duration::ZERO;
        for _ in 0..self.settings.ping_samples {
            let start = Instant::now();
            let response = self.send_get("ping", url.clone()).await?;
            total += start.elapsed();
            let _ = response.bytes().await;
        }

        Ok(total.as_secs_f64() * 1000.0 / f64::from(self.settings.ping_samples))
    }

    async fn measure_download(&self) -> std::result::Result<f64, MeasurementError> {
        let url = self.sized_download_url(self.settings.download_bytes);

        let start = Instant::now();
        let response = self.send_get("download", url).await?;

        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MeasurementError::from_reqwest("download", e))?;
            received += chunk.len() as u64;
        }
        let elapsed = start.elapsed();

        if received == 0 {
            return Err(MeasurementError::invalid("download endpoint returned an empty body"));
        }

        Ok(megabits_per_second(received, elapsed))
    }

    async fn measure_upload(&self) -> std::result::Result<f64, MeasurementError> {
        let size = self.settings.upload_bytes;
        let chunks = stream::iter(
            chunk_lengths(size).map(|len| Ok::<_, std::io::Error>(&ZEROS[..len])),
        );

        let start = Instant::now();
        let response = self
            .client
            .post(self.upload_url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(chunks))
            .send()
            .await
            .map_err(|e| MeasurementError::from_reqwest("upload", e))?;
        let elapsed = start.elapsed();
        check_status("upload", &response)?;
        let _ = response.bytes().await;

        Ok(megabits_per_second(size, elapsed))
    }

    async fn send_get(
        &self,
        stage: &'static str,
        url: Url,
    ) -> std::result::Result<Response, MeasurementError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MeasurementError::from_reqwest(stage, e))?;
        check_status(stage, &response)?;
        Ok(response)
    }
}

#[async_trait]
impl MeasurementProvider for HttpSpeedProvider {
    async fn measure(&self) -> std::result::Result<Measurement, MeasurementError> {
        let limit = self.settings.timeout();

        let test = async {
            let ping_ms = self.measure_ping().await?;
            let download_mbps = self.measure_download().await?;
            let upload_mbps = self.measure_upload().await?;
            Measurement::new(download_mbps, upload_mbps, ping_ms)
        };

        tokio::time::timeout(limit, test)
            .await
            .map_err(|_| MeasurementError::Timeout(limit))?
    }

    fn name(&self) -> &str {
        self.download_url.host_str().unwrap_or("http")
    }
}

/// Block sizes adding up to `total`, none larger than `UPLOAD_CHUNK`
fn chunk_lengths(total: u64) -> impl Iterator<Item = usize> + Send + 'static {
    (0..total)
        .step_by(UPLOAD_CHUNK)
        .map(move |offset| (total - offset).min(UPLOAD_CHUNK as u64) as usize)
}

fn check_status(
    stage: &'static str,
    response: &Response,
) -> std::result::Result<(), MeasurementError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(MeasurementError::HttpStatus {
            stage,
            status: status.as_u16(),
        })
    }
}

/// Bytes over elapsed wall time, as megabits per second (1 Mbit = 10^6 bits)
fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64().max(1e-6);
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}
