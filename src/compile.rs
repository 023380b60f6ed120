//! End-to-end compilation: resolve, fetch, assemble.
//!
//! [`Compiler`] wires the three stages together. Every stage is also usable
//! on its own through the [`resolver`](crate::resolver),
//! [`download`](crate::download) and [`pdf`](crate::pdf) modules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::catalog::{Catalog, DEFAULT_BASE_URL, DEFAULT_ITERATION_BOUND, GroupId, normalize_base_url};
use crate::download::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MIN_FILE_SIZE, READ_TIMEOUT_SECS};
use crate::download::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_PROBE_ATTEMPTS, DownloadError,
    DownloadedAsset, EngineError, FetchEngine, FetchStats, HttpClient, RetryPolicy, plan_fetches,
    save_part,
};
use crate::pdf::{AssemblyError, merge_assets, write_output};
use crate::period::{DEFAULT_LOOKBACK_MONTHS, Period};
use crate::resolver::{
    ExistenceOracle, HttpProbe, Resolution, RevisionResolver, canonical_period,
};
use crate::user_agent;

/// Prefix of the compiled file name; the period and `.pdf` follow.
const OUTPUT_PREFIX: &str = "aip_uruguay_compiled_";

/// Name of the compiled file for `period`: `aip_uruguay_compiled_YYYY-MM.pdf`.
#[must_use]
pub fn output_file_name(period: Period) -> String {
    format!("{OUTPUT_PREFIX}{period}.pdf")
}

/// Fatal compilation errors.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Nothing resolved, nothing downloaded, or nothing could be merged.
    #[error("no AIP documents could be compiled")]
    EmptyCompilation,

    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be created.
    #[error(transparent)]
    Client(#[from] DownloadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Pdf(AssemblyError),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking merge task panicked or was cancelled.
    #[error("assembly task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<AssemblyError> for CompileError {
    fn from(error: AssemblyError) -> Self {
        match error {
            AssemblyError::Empty => Self::EmptyCompilation,
            AssemblyError::Io { path, source } => Self::Io { path, source },
            other => Self::Pdf(other),
        }
    }
}

/// Everything a run needs; the binary fills this from CLI flags and config.
#[derive(Debug, Clone)]
pub struct CompileSettings {
    /// Folder that contains the `YYYY-MM` subfolders.
    pub base_url: String,
    /// First period probed; the search walks backward from here.
    pub as_of: Period,
    pub lookback_months: u32,
    pub iteration_bound: u32,
    pub workers: usize,
    pub probe_attempts: u32,
    pub fetch_attempts: u32,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Overrides the default browser-like User-Agent.
    pub user_agent: Option<String>,
    pub min_file_size: u64,
    pub output_dir: PathBuf,
    /// When set, every fetched part is also saved here.
    pub parts_dir: Option<PathBuf>,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            as_of: Period::current(),
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            iteration_bound: DEFAULT_ITERATION_BOUND,
            workers: DEFAULT_CONCURRENCY,
            probe_attempts: DEFAULT_PROBE_ATTEMPTS,
            fetch_attempts: DEFAULT_MAX_RETRIES,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            user_agent: None,
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            output_dir: PathBuf::from("."),
            parts_dir: None,
        }
    }
}

/// Per-group line of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: GroupId,
    /// `None` when the group was not found within the lookback window.
    pub period: Option<Period>,
    pub files: usize,
    /// An unreachable candidate cut the file series short.
    pub interrupted: bool,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    /// Period used in the output file name (newest period among merged parts).
    pub period: Period,
    pub output: PathBuf,
    pub groups: Vec<GroupReport>,
    /// Assets downloaded successfully.
    pub fetched: usize,
    /// Assets that could not be downloaded.
    pub failed: usize,
    /// Downloaded assets that could not be merged.
    pub skipped: usize,
    pub pages: usize,
    pub bytes: usize,
    /// Lowercase hex SHA-256 of the output file.
    pub sha256: String,
}

impl CompileReport {
    /// True when every group resolved in full and every asset was merged.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed == 0
            && self.skipped == 0
            && self
                .groups
                .iter()
                .all(|g| g.period.is_some() && !g.interrupted)
    }
}

/// The resolve, fetch and assemble pipeline.
///
/// # Example
///
/// ```no_run
/// use aip_core::compile::{CompileSettings, Compiler};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let compiler = Compiler::new(CompileSettings::default())?;
/// let report = compiler.run().await?;
/// println!("{} ({} pages)", report.output.display(), report.pages);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Compiler {
    settings: CompileSettings,
    catalog: Catalog,
    client: HttpClient,
    resolver: RevisionResolver,
    engine: FetchEngine,
}

impl Compiler {
    /// Builds a compiler that probes over HTTP.
    ///
    /// # Errors
    ///
    /// Fails on an invalid base URL, an unbuildable HTTP client or an
    /// out-of-range worker count.
    pub fn new(settings: CompileSettings) -> Result<Self, CompileError> {
        let client = build_client(&settings)?;
        let probe = HttpProbe::new(client.clone(), RetryPolicy::probe(settings.probe_attempts));
        Self::assemble(settings, client, Arc::new(probe))
    }

    /// Builds a compiler that answers existence checks with `oracle`.
    ///
    /// # Errors
    ///
    /// Same as [`Compiler::new`].
    pub fn with_oracle(
        settings: CompileSettings,
        oracle: Arc<dyn ExistenceOracle>,
    ) -> Result<Self, CompileError> {
        let client = build_client(&settings)?;
        Self::assemble(settings, client, oracle)
    }

    fn assemble(
        settings: CompileSettings,
        client: HttpClient,
        oracle: Arc<dyn ExistenceOracle>,
    ) -> Result<Self, CompileError> {
        let base_url: Url =
            normalize_base_url(&settings.base_url).map_err(|source| CompileError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                source,
            })?;
        let resolver = RevisionResolver::new(oracle, base_url, settings.lookback_months);
        let engine = FetchEngine::new(
            settings.workers,
            RetryPolicy::with_max_attempts(settings.fetch_attempts),
            settings.min_file_size,
        )?;

        Ok(Self {
            catalog: Catalog::standard(settings.iteration_bound),
            settings,
            client,
            resolver,
            engine,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// Live fetch counters, for progress display.
    #[must_use]
    pub fn stats(&self) -> Arc<FetchStats> {
        self.engine.stats()
    }

    /// Runs revision discovery only.
    pub async fn resolve(&self) -> Vec<Resolution> {
        self.resolver
            .resolve_catalog(&self.catalog, self.settings.as_of)
            .await
    }

    /// Runs the whole pipeline and writes the compiled PDF.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptyCompilation`] when no document could be
    /// compiled; no output file is written in that case.
    #[instrument(skip(self), fields(as_of = %self.settings.as_of))]
    pub async fn run(&self) -> Result<CompileReport, CompileError> {
        let resolutions = self.resolve().await;
        let groups: Vec<GroupReport> = resolutions.iter().map(group_report).collect();

        let Some(newest) = canonical_period(&resolutions) else {
            error!(
                window = self.settings.lookback_months,
                "no group resolved within the lookback window"
            );
            return Err(CompileError::EmptyCompilation);
        };
        info!(period = %newest, "newest resolved period");

        let tasks = plan_fetches(&resolutions);
        let outcome = self.engine.fetch_all(&self.client, tasks).await?;

        if let Some(dir) = &self.settings.parts_dir {
            for asset in &outcome.assets {
                if let Err(e) = save_part(dir, asset).await {
                    warn!(error = %e, "could not save part");
                }
            }
        }

        if outcome.assets.is_empty() {
            error!(failed = outcome.failures.len(), "every download failed");
            return Err(CompileError::EmptyCompilation);
        }

        let fetched = outcome.assets.len();
        let failed = outcome.failures.len();
        let assets = outcome.assets;
        let output_dir = self.settings.output_dir.clone();
        let (merged, period, output) = tokio::task::spawn_blocking(move || {
            let merged = merge_assets(&assets)?;
            let period =
                compiled_period(&assets, &merged.merged).ok_or(CompileError::EmptyCompilation)?;
            let output = output_dir.join(output_file_name(period));
            write_output(&output, &merged.bytes)?;
            Ok::<_, CompileError>((merged, period, output))
        })
        .await??;

        if period != newest {
            warn!(
                %period,
                newest = %newest,
                "nothing from the newest resolved period was compiled; output named after the newest merged part"
            );
        }

        let report = CompileReport {
            period,
            output,
            groups,
            fetched,
            failed,
            skipped: merged.skipped.len(),
            pages: merged.page_count,
            bytes: merged.bytes.len(),
            sha256: sha256_hex(&merged.bytes),
        };

        info!(
            output = %report.output.display(),
            pages = report.pages,
            fetched,
            failed,
            skipped = report.skipped,
            complete = report.is_complete(),
            "compilation written"
        );
        Ok(report)
    }
}

fn build_client(settings: &CompileSettings) -> Result<HttpClient, CompileError> {
    let user_agent = settings
        .user_agent
        .clone()
        .unwrap_or_else(user_agent::default_user_agent);
    Ok(HttpClient::with_settings(
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
        &user_agent,
    )?)
}

/// Newest period among the assets that made it into the merged document.
fn compiled_period(assets: &[DownloadedAsset], merged: &[usize]) -> Option<Period> {
    assets
        .iter()
        .filter(|asset| merged.contains(&asset.task.ordinal))
        .map(|asset| asset.task.period)
        .max()
}

fn group_report(resolution: &Resolution) -> GroupReport {
    GroupReport {
        group: resolution.group(),
        period: resolution.period(),
        files: resolution.document().map_or(0, |doc| doc.files.len()),
        interrupted: resolution.document().is_some_and(|doc| doc.interrupted),
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file already on disk.
///
/// # Errors
///
/// Returns [`CompileError::Io`] if the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String, CompileError> {
    let bytes = std::fs::read(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(sha256_hex(&bytes))
}
