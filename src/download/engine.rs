//! Fetch engine for concurrent in-memory downloads with retry support.
//!
//! This module provides the [`FetchEngine`] which downloads every planned
//! [`FetchTask`] using a semaphore-based concurrency control pattern, with
//! automatic retry on transient failures using exponential backoff.
//!
//! # Ordering
//!
//! Tasks finish in whatever order the network allows. Each spawned task owns
//! its result; after every handle has been joined the engine places results
//! into slots addressed by ordinal, so the returned assets are always in
//! assembly order. Only the [`FetchStats`] counters are shared while tasks run.
//!
//! # Example
//!
//! ```no_run
//! use aip_core::download::{FetchEngine, HttpClient, RetryPolicy, plan_fetches};
//! use aip_core::resolver::Resolution;
//!
//! # async fn example(resolutions: Vec<Resolution>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = FetchEngine::new(10, RetryPolicy::default(), 1024)?;
//! let client = HttpClient::new()?;
//! let outcome = engine.fetch_all(&client, plan_fetches(&resolutions)).await?;
//! let stats = engine.stats();
//! println!("Completed: {}, Failed: {}, Retried: {}", stats.completed(), stats.failed(), stats.retried());
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::retry::{RetryPolicy, with_retry};
use super::{DownloadError, HttpClient};
use crate::catalog::GroupId;
use crate::period::Period;
use crate::resolver::Resolution;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default number of concurrent fetch workers.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Error type for fetch engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Live counters for a fetch run.
///
/// Updated from the spawned tasks with atomics; the progress spinner reads
/// them while the run is in flight.
#[derive(Debug, Default)]
pub struct FetchStats {
    planned: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
}

impl FetchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks handed to the current run.
    #[must_use]
    pub fn planned(&self) -> usize {
        self.planned.load(Ordering::SeqCst)
    }

    /// Returns the number of successfully fetched assets.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed fetches.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of tasks finished (completed + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Returns the number of retry attempts made.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    fn add_planned(&self, count: usize) {
        self.planned.fetch_add(count, Ordering::SeqCst);
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn add_retried(&self, count: usize) {
        self.retried.fetch_add(count, Ordering::SeqCst);
    }
}

/// One concrete URL to download, tagged with its assembly position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    /// Position in the compiled document; assigned before dispatch.
    pub ordinal: usize,
    pub group: GroupId,
    /// Index inside an iterable group; `None` for fixed groups.
    pub index: Option<u32>,
    pub period: Period,
    pub url: Url,
}

impl FetchTask {
    /// Human-readable label such as `General[2]` or `Amendment`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.index {
            Some(index) => format!("{}[{index}]", self.group),
            None => self.group.to_string(),
        }
    }

    /// File name used when saving the part: `General_2.pdf`, `Amendment.pdf`.
    #[must_use]
    pub fn part_file_name(&self) -> String {
        match self.index {
            Some(index) => format!("{}_{index}.pdf", self.group),
            None => format!("{}.pdf", self.group),
        }
    }
}

/// A fetched document body together with the task that produced it.
#[derive(Debug, Clone)]
pub struct DownloadedAsset {
    pub task: FetchTask,
    pub bytes: Vec<u8>,
}

/// A task that could not be fetched.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub task: FetchTask,
    /// Final error message (or panic description).
    pub reason: String,
    pub attempts: u32,
}

/// Result of [`FetchEngine::fetch_all`].
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Successful downloads in ascending ordinal order.
    pub assets: Vec<DownloadedAsset>,
    /// Failed downloads in ascending ordinal order.
    pub failures: Vec<FetchFailure>,
}

/// Flattens resolved documents into fetch tasks in assembly order.
///
/// Groups are ordered by [`GroupId`]; files keep their ascending index order.
/// Ordinals run from 0 without gaps. Exhausted groups contribute nothing.
#[must_use]
pub fn plan_fetches(resolutions: &[Resolution]) -> Vec<FetchTask> {
    let mut documents: Vec<_> = resolutions
        .iter()
        .filter_map(Resolution::document)
        .collect();
    documents.sort_by_key(|doc| doc.group);

    documents
        .into_iter()
        .flat_map(|doc| doc.files.iter().map(move |file| (doc, file)))
        .enumerate()
        .map(|(ordinal, (doc, file))| FetchTask {
            ordinal,
            group: doc.group,
            index: file.index,
            period: doc.period,
            url: file.url.clone(),
        })
        .collect()
}

/// Fetch engine for concurrent downloads with retry support.
///
/// # Concurrency Model
///
/// - Each fetch runs in its own Tokio task
/// - A semaphore permit is acquired before spawning each task
/// - Permits are released automatically when fetches complete (RAII)
/// - Handles are joined in ordinal order, then results are slotted
///
/// # Retry Behavior
///
/// - Transient errors (network issues, 5xx, truncated bodies) are retried
///   with exponential backoff
/// - Permanent errors (404, undersized bodies) fail immediately
#[derive(Debug)]
pub struct FetchEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    /// Retry policy for failed fetches.
    retry_policy: RetryPolicy,
    /// Bodies below this size are rejected.
    min_file_size: u64,
    stats: Arc<FetchStats>,
}

impl FetchEngine {
    /// Creates a new fetch engine.
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Maximum number of concurrent fetches (1-100)
    /// * `retry_policy` - Policy for retrying failed fetches
    /// * `min_file_size` - Smallest acceptable body in bytes
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn new(
        concurrency: usize,
        retry_policy: RetryPolicy,
        min_file_size: u64,
    ) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            max_retries = retry_policy.max_attempts(),
            min_file_size,
            "creating fetch engine"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            retry_policy,
            min_file_size,
            stats: Arc::new(FetchStats::new()),
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Shared handle to the live counters.
    #[must_use]
    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    /// Downloads every task concurrently and returns results in ordinal order.
    ///
    /// Individual fetch failures do NOT cause this method to error; they are
    /// logged and reported in [`FetchOutcome::failures`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, client, tasks), fields(tasks = tasks.len()))]
    pub async fn fetch_all(
        &self,
        client: &HttpClient,
        mut tasks: Vec<FetchTask>,
    ) -> Result<FetchOutcome, EngineError> {
        tasks.sort_by_key(|task| task.ordinal);
        self.stats.add_planned(tasks.len());
        let mut handles = Vec::with_capacity(tasks.len());

        info!(workers = self.concurrency, "starting fetch");

        for task in &tasks {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let client = client.clone();
            let stats = Arc::clone(&self.stats);
            let retry_policy = self.retry_policy.clone();
            let min_file_size = self.min_file_size;
            let url = task.url.to_string();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result = fetch_with_retry(&client, &url, &retry_policy, min_file_size).await;
                let attempts = match &result {
                    Ok((_, attempts)) | Err((_, attempts)) => *attempts,
                };
                stats.add_retried(attempts.saturating_sub(1) as usize);
                match &result {
                    Ok(_) => stats.increment_completed(),
                    Err(_) => stats.increment_failed(),
                }
                result
            }));
        }

        debug!(
            task_count = handles.len(),
            "waiting for fetches to complete"
        );

        // Barrier: every handle is joined before any slot is read.
        let mut slots = Vec::with_capacity(handles.len());
        for handle in handles {
            slots.push(handle.await);
        }

        let mut outcome = FetchOutcome::default();
        for (task, slot) in tasks.into_iter().zip(slots) {
            match slot {
                Ok(Ok((bytes, attempts))) => {
                    info!(
                        ordinal = task.ordinal,
                        group = %task.group,
                        index = task.index,
                        period = %task.period,
                        url = %task.url,
                        bytes = bytes.len(),
                        attempts,
                        "fetch completed"
                    );
                    outcome.assets.push(DownloadedAsset { task, bytes });
                }
                Ok(Err((error, attempts))) => {
                    warn!(
                        ordinal = task.ordinal,
                        group = %task.group,
                        index = task.index,
                        period = %task.period,
                        url = %task.url,
                        error = %error,
                        attempts,
                        "fetch failed after all attempts"
                    );
                    outcome.failures.push(FetchFailure {
                        task,
                        reason: error.to_string(),
                        attempts,
                    });
                }
                Err(join_error) => {
                    warn!(
                        ordinal = task.ordinal,
                        url = %task.url,
                        error = %join_error,
                        "fetch task panicked"
                    );
                    self.stats.increment_failed();
                    outcome.failures.push(FetchFailure {
                        task,
                        reason: join_error.to_string(),
                        attempts: 0,
                    });
                }
            }
        }

        info!(
            completed = outcome.assets.len(),
            failed = outcome.failures.len(),
            retried = self.stats.retried(),
            "fetch complete"
        );

        Ok(outcome)
    }
}

/// Downloads one URL, retrying transient errors and enforcing the size floor.
async fn fetch_with_retry(
    client: &HttpClient,
    url: &str,
    policy: &RetryPolicy,
    min_file_size: u64,
) -> Result<(Vec<u8>, u32), (DownloadError, u32)> {
    with_retry(policy, url, move || async move {
        let bytes = client.fetch_bytes(url).await?;
        let actual = bytes.len() as u64;
        if actual < min_file_size {
            return Err(DownloadError::too_small(url, actual, min_file_size));
        }
        Ok(bytes)
    })
    .await
}

/// Writes a fetched asset into `dir` as `<Group>_<index>.pdf`.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if the directory or file cannot be written.
pub async fn save_part(dir: &Path, asset: &DownloadedAsset) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))?;
    let path = dir.join(asset.task.part_file_name());
    tokio::fs::write(&path, &asset.bytes)
        .await
        .map_err(|e| DownloadError::io(&path, e))?;
    debug!(path = %path.display(), "part saved");
    Ok(path)
}
