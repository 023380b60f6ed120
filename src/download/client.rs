//! HTTP client wrapper for existence probes and in-memory downloads.
//!
//! This module provides the `HttpClient` struct, which sends the lightweight
//! existence checks the revision search relies on and streams document
//! bodies into memory with timeout configuration and error handling.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client shared by the resolver and the fetch engine.
///
/// Cloning is cheap and shares the connection pool.
///
/// # Example
///
/// ```no_run
/// use aip_core::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// client.probe("https://www.dinacia.gub.uy/sites/default/files/aip/2025-02/Gen0.pdf").await?;
/// let bytes = client.fetch_bytes("https://www.dinacia.gub.uy/sites/default/files/aip/2025-02/Gen0.pdf").await?;
/// println!("{} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with default timeouts and User-Agent.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Request timeout: 60 seconds
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_settings(
            CONNECT_TIMEOUT_SECS,
            READ_TIMEOUT_SECS,
            &user_agent::default_user_agent(),
        )
    }

    /// Creates a client with explicit timeouts and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_settings(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Checks that `url` exists without downloading its body.
    ///
    /// Sends `HEAD`; servers that reject `HEAD` (405/501) are asked with a
    /// `GET` whose body is dropped as soon as the status line arrives.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::HttpStatus`] for non-success statuses (404 means
    /// the candidate does not exist) and network/timeout errors otherwise.
    #[instrument(level = "debug", skip(self))]
    pub async fn probe(&self, url: &str) -> Result<(), DownloadError> {
        match self.send_request(Method::HEAD, url).await {
            Ok(_) => Ok(()),
            Err(DownloadError::HttpStatus { status, .. })
                if status == StatusCode::METHOD_NOT_ALLOWED.as_u16()
                    || status == StatusCode::NOT_IMPLEMENTED.as_u16() =>
            {
                debug!(status, "HEAD rejected, probing with GET");
                let response = self.send_request(Method::GET, url).await?;
                drop(response);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Downloads the full body of `url` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] if the request fails, the server answers
    /// with an error status, or the body is shorter than its Content-Length.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.send_request(Method::GET, url).await?;
        let content_length = response.content_length();
        let body = stream_to_memory(response, url).await?;

        if let Some(expected) = content_length {
            let actual = body.len() as u64;
            if expected != actual {
                return Err(DownloadError::integrity(url, expected, actual));
            }
        }

        debug!(bytes = body.len(), "body received");
        Ok(body)
    }

    async fn send_request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

/// Collects a streamed response body.
async fn stream_to_memory(response: reqwest::Response, url: &str) -> Result<Vec<u8>, DownloadError> {
    let capacity = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let mut body = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadError::from_reqwest(url, e))?;
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
