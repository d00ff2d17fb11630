// src/migrate/fetch.rs

//! Blocking HTTP transport for remote picture downloads
//!
//! Failures are reported once; the importer does not retry.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::traits::RemoteFetch;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// HTTP client downloading into temporary files
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gallery-migrate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl RemoteFetch for HttpFetcher {
    fn download(&self, url: &str) -> Result<NamedTempFile> {
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::FetchError(format!("network error fetching {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::FetchError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let mut file = NamedTempFile::new()
            .map_err(|e| Error::IoError(format!("Failed to create temp file: {e}")))?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| Error::FetchError(format!("Failed to read response from {url}: {e}")))?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])
                .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;
            downloaded += bytes_read as u64;
        }
        file.flush()
            .map_err(|e| Error::IoError(format!("Failed to flush download: {e}")))?;

        debug!("Downloaded {} bytes from {}", downloaded, url);
        Ok(file)
    }
}
