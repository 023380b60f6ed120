//! Error types for the download module.
//!
//! These cover both existence probes and full downloads; every variant
//! carries the URL so a failed run can be replayed from the log alone.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while probing or downloading a document.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a part file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Downloaded body size does not match the server's Content-Length.
    #[error("integrity check failed for {url}: expected {expected_bytes} bytes, got {actual_bytes}")]
    Integrity {
        /// The URL whose body was truncated.
        url: String,
        /// Expected size in bytes.
        expected_bytes: u64,
        /// Actual size in bytes.
        actual_bytes: u64,
    },

    /// Body is too small to be a real document (typically an HTML error page).
    #[error("file from {url} too small: {actual_bytes} bytes (minimum {min_bytes})")]
    TooSmall {
        /// The URL that served the body.
        url: String,
        /// Received size in bytes.
        actual_bytes: u64,
        /// Configured floor in bytes.
        min_bytes: u64,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Maps a reqwest send/stream error, promoting timeouts to [`Self::Timeout`].
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(url: impl Into<String>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            url: url.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates a too-small body error.
    pub fn too_small(url: impl Into<String>, actual_bytes: u64, min_bytes: u64) -> Self {
        Self::TooSmall {
            url: url.into(),
            actual_bytes,
            min_bytes,
        }
    }

    /// Returns true for statuses that mean "this candidate does not exist".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404 | 410, .. })
    }
}

// Context-carrying constructors stand in for `From<reqwest::Error>`: the
// source errors do not know which URL or path they belong to.
