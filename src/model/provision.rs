use crate::config::ModelConfig;
use futures_util::StreamExt;
use metrics::counter;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Capacity of the write buffer. Network chunks at least this large bypass it.
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No remote model identifier configured")]
    MissingRemoteId,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("Downloaded artifact is empty")]
    EmptyArtifact,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(_) => true,
            FetchError::Status(status) => status.is_server_error(),
            _ => false,
        }
    }
}

/// How the model file came to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// A file was already at the path. Its contents were not inspected.
    Cached,
    /// The file was downloaded by this call.
    Fetched { bytes: u64 },
}

/// Downloads the model artifact from a remote blob store when no local copy exists.
pub struct ModelProvisioner {
    client: reqwest::Client,
    url_template: String,
    retries: u32,
    retry_backoff: Duration,
}

impl ModelProvisioner {
    pub fn new(config: &ModelConfig) -> Result<Self, FetchError> {
        // Bounds connecting and each read, not the whole transfer.
        let idle_timeout = Duration::from_secs(config.download_timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(idle_timeout)
            .read_timeout(idle_timeout)
            .build()?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            retries: config.download_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn download_url(&self, remote_id: &str) -> String {
        self.url_template.replace("{id}", remote_id)
    }

    /// Makes sure a file exists at `path`, downloading it if absent.
    ///
    /// Existing files are trusted as-is. A failed download never leaves a file at `path`.
    pub async fn ensure_model_present(
        &self,
        path: impl AsRef<Path>,
        remote_id: Option<&str>,
    ) -> Result<Provisioned, FetchError> {
        let path = path.as_ref();
        if fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "Model already present, skipping download");
            return Ok(Provisioned::Cached);
        }

        let remote_id = remote_id
            .filter(|id| !id.is_empty())
            .ok_or(FetchError::MissingRemoteId)?;
        let url = self.download_url(remote_id);

        let mut attempt = 0;
        loop {
            tracing::info!(path = %path.display(), attempt, "Downloading model");
            match self.download(&url, path).await {
                Ok(bytes) => {
                    counter!("phishguard_model_downloads_total", "outcome" => "success")
                        .increment(1);
                    tracing::info!(path = %path.display(), bytes, "Model downloaded");
                    return Ok(Provisioned::Fetched { bytes });
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    tracing::warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Model download failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    counter!("phishguard_model_downloads_total", "outcome" => "failure")
                        .increment(1);
                    return Err(e);
                }
            }
        }
    }

    /// Streams the body into `<path>.part` and renames it onto `path` once complete.
    async fn download(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let partial = partial_path(path);
        let result = self.download_to(url, &partial).await;
        match result {
            Ok(bytes) => {
                fs::rename(&partial, path).await?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let file = fs::File::create(dest).await?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        if written == 0 {
            return Err(FetchError::EmptyArtifact);
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok(written)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
