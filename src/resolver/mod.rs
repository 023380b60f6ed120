//! Revision discovery: find the newest published period of each group.
//!
//! The search walks a [`Lookback`](crate::period::Lookback) window backward
//! from the current month and asks an [`ExistenceOracle`] whether candidate
//! URLs exist. The oracle is a trait so the walk can be exercised without a
//! network; [`HttpProbe`] is the production implementation.
//!
//! # Architecture
//!
//! - [`ExistenceOracle`] - Async trait answering "does this URL exist?"
//! - [`HttpProbe`] - `HEAD`-based oracle with bounded retry
//! - [`RevisionResolver`] - Per-group backward search and catalog fan-out
//! - [`Resolution`] - Outcome for one group (resolved or exhausted)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aip_core::catalog::{Catalog, DEFAULT_BASE_URL, normalize_base_url};
//! use aip_core::download::{HttpClient, RetryPolicy};
//! use aip_core::period::Period;
//! use aip_core::resolver::{HttpProbe, RevisionResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let probe = HttpProbe::new(HttpClient::new()?, RetryPolicy::probe(2));
//! let resolver = RevisionResolver::new(Arc::new(probe), normalize_base_url(DEFAULT_BASE_URL)?, 24);
//! for resolution in resolver.resolve_catalog(&Catalog::default(), Period::current()).await {
//!     println!("{}: {:?}", resolution.group(), resolution.period());
//! }
//! # Ok(())
//! # }
//! ```

mod http_probe;
mod search;

pub use http_probe::HttpProbe;
pub use search::RevisionResolver;

use async_trait::async_trait;
use url::Url;

use crate::catalog::GroupId;
use crate::period::Period;

/// Answer to a single existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The candidate URL serves a document.
    Found,
    /// The server says the candidate does not exist.
    Missing,
    /// No definitive answer after retries; handled as missing.
    Unreachable {
        /// Last error seen.
        reason: String,
    },
}

impl ProbeOutcome {
    #[must_use]
    pub fn exists(&self) -> bool {
        matches!(self, Self::Found)
    }
}

/// Existence check for candidate URLs.
///
/// Uses `async_trait` so resolvers can hold `Arc<dyn ExistenceOracle>`.
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Checks whether `url` exists. Never fails: transport problems map to
    /// [`ProbeOutcome::Unreachable`].
    async fn probe(&self, url: &Url) -> ProbeOutcome;
}

/// One concrete file of a resolved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Position inside an iterable group; `None` for fixed groups.
    pub index: Option<u32>,
    pub url: Url,
}

/// A group together with the files found for its newest period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub group: GroupId,
    pub period: Period,
    /// Ascending, gap-free indices for iterable groups; one entry for fixed groups.
    pub files: Vec<ResolvedFile>,
    /// The series ended at an unreachable candidate, so later files may exist.
    pub interrupted: bool,
}

/// Result of searching one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedDocument),
    /// Nothing published within the lookback window.
    Exhausted { group: GroupId, window: u32 },
}

impl Resolution {
    #[must_use]
    pub fn group(&self) -> GroupId {
        match self {
            Self::Resolved(doc) => doc.group,
            Self::Exhausted { group, .. } => *group,
        }
    }

    #[must_use]
    pub fn document(&self) -> Option<&ResolvedDocument> {
        match self {
            Self::Resolved(doc) => Some(doc),
            Self::Exhausted { .. } => None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Option<Period> {
        self.document().map(|doc| doc.period)
    }
}

/// Newest period among resolved groups; names the compiled output.
#[must_use]
pub fn canonical_period(resolutions: &[Resolution]) -> Option<Period> {
    resolutions.iter().filter_map(Resolution::period).max()
}
