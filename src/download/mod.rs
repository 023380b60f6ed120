//! HTTP probing and concurrent in-memory downloads.
//!
//! # Features
//!
//! - `HEAD` existence probes with a `GET` fallback for servers that reject `HEAD`
//! - Streaming downloads with Content-Length integrity checks
//! - Bounded-concurrency fetch engine with ordinal-preserving results
//! - Exponential backoff retry with jitter for transient failures
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use aip_core::download::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let bytes = client
//!     .fetch_bytes("https://www.dinacia.gub.uy/sites/default/files/aip/2025-02/Gen0.pdf")
//!     .await?;
//! println!("Downloaded {} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod retry;

pub use client::HttpClient;
pub use engine::{
    DEFAULT_CONCURRENCY, DownloadedAsset, EngineError, FetchEngine, FetchFailure, FetchOutcome,
    FetchStats, FetchTask, plan_fetches, save_part,
};
pub use error::DownloadError;
pub use retry::{
    DEFAULT_MAX_RETRIES, DEFAULT_PROBE_ATTEMPTS, FailureType, RetryDecision, RetryPolicy,
    classify_error, with_retry,
};

// Module-local Result aliases are not defined here.
// Use `Result<T, DownloadError>` explicitly in function signatures.
