//! Streaming fetcher for a single media file.
//!
//! This module provides the `MediaFetcher` struct which downloads one item
//! descriptor's media URL to an already-allocated local path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::{FETCH_TIMEOUT_SECS, WRITE_CHUNK_SIZE};
use super::error::FetchError;
use crate::http::{ClientTimeouts, build_client};
use crate::item::ItemDescriptor;

/// HTTP fetcher for media files.
///
/// Created once per run and cloned into each download task; clones share the
/// underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use media_export::{ItemDescriptor, MediaFetcher};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = MediaFetcher::new()?;
/// let item = ItemDescriptor::new("https://cdn.example.com/clip.mp4", Some("mp4"), "alice")
///     .ok_or("empty url")?;
/// let path = fetcher.fetch(&item, Path::new("/tmp/alice.mp4")).await?;
/// println!("Downloaded to: {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    client: Client,
    timeout: Duration,
}

impl MediaFetcher {
    /// Creates a fetcher with the default 10 second connect/read timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    /// Creates a fetcher with an explicit connect/read timeout.
    ///
    /// The timeout bounds connecting and each read from the socket, not the
    /// whole transfer, so large files are not cut off while data keeps flowing.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_client(ClientTimeouts::PerRead(timeout))?;
        Ok(Self { client, timeout })
    }

    /// The configured connect/read timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Downloads `item`'s media to `target_path`.
    ///
    /// The file is created only once the server has answered with a success
    /// status, and removed again if streaming the body fails, so an error
    /// never leaves a file behind.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the URL is invalid, the request fails or
    /// times out, the server answers with a non-success status, or writing to
    /// disk fails.
    #[instrument(skip(self, item), fields(url = %item.media_url(), path = %target_path.display()))]
    pub async fn fetch(
        &self,
        item: &ItemDescriptor,
        target_path: &Path,
    ) -> Result<PathBuf, FetchError> {
        let url = item.media_url();
        let parsed_url = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(FetchError::invalid_url(url));
        }

        let response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let file = File::create(target_path)
            .await
            .map_err(|e| FetchError::io(target_path, e))?;
        let mut writer = BufWriter::new(file);

        match stream_to_file(&mut writer, response, url, target_path).await {
            Ok(bytes) => {
                debug!(bytes, "media fetched");
                Ok(target_path.to_path_buf())
            }
            Err(error) => {
                drop(writer);
                debug!(error = %error, "removing partial file after failed fetch");
                remove_partial_file(target_path).await;
                Err(error)
            }
        }
    }
}

/// Deletes a partially written download. Returns whether the path is gone.
async fn remove_partial_file(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove partial download");
            false
        }
    }
}

/// Streams the response body through `file` in fixed-size writes, returning bytes written.
async fn stream_to_file(
    file: &mut BufWriter<File>,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::from_reqwest(url, e))?;

        for piece in chunk.chunks(WRITE_CHUNK_SIZE) {
            file.write_all(piece)
                .await
                .map_err(|e| FetchError::io(file_path, e))?;
        }

        bytes_written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    Ok(bytes_written)
}
