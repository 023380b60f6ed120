//! Backward month-by-month search for each document group.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, info, instrument, warn};
use url::Url;

use super::{ExistenceOracle, ProbeOutcome, Resolution, ResolvedDocument, ResolvedFile};
use crate::catalog::{Catalog, DocumentGroup, GroupKind};
use crate::period::Period;

/// Searches the lookback window for the newest period of each group.
pub struct RevisionResolver {
    oracle: Arc<dyn ExistenceOracle>,
    base_url: Url,
    window: u32,
}

impl std::fmt::Debug for RevisionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionResolver")
            .field("oracle", &self.oracle.name())
            .field("base_url", &self.base_url.as_str())
            .field("window", &self.window)
            .finish()
    }
}

impl RevisionResolver {
    /// `base_url` must end with `/` (see [`crate::catalog::normalize_base_url`]).
    #[must_use]
    pub fn new(oracle: Arc<dyn ExistenceOracle>, base_url: Url, window: u32) -> Self {
        Self {
            oracle,
            base_url,
            window,
        }
    }

    /// Resolves every group of `catalog` concurrently.
    ///
    /// Results come back in catalog order, one per group.
    pub async fn resolve_catalog(&self, catalog: &Catalog, start: Period) -> Vec<Resolution> {
        info!(%start, window = self.window, groups = catalog.groups().len(), "resolving catalog");
        join_all(
            catalog
                .groups()
                .iter()
                .map(|group| self.resolve_group(group, start)),
        )
        .await
    }

    /// Walks backward from `start` and stops at the first period where the
    /// group has at least one file.
    #[instrument(skip(self, group), fields(group = %group.id))]
    pub async fn resolve_group(&self, group: &DocumentGroup, start: Period) -> Resolution {
        for period in start.lookback(self.window) {
            let Series { files, interrupted } = self.files_at(group, period).await;
            if !files.is_empty() {
                info!(
                    group = %group.id,
                    %period,
                    files = files.len(),
                    months_back = start.months_until(period).unsigned_abs(),
                    "group resolved"
                );
                return Resolution::Resolved(ResolvedDocument {
                    group: group.id,
                    period,
                    files,
                    interrupted,
                });
            }
        }

        warn!(
            group = %group.id,
            %start,
            window = self.window,
            "no revision found within lookback window; group omitted"
        );
        Resolution::Exhausted {
            group: group.id,
            window: self.window,
        }
    }

    /// Files of `group` published for `period`; empty when the period is absent.
    async fn files_at(&self, group: &DocumentGroup, period: Period) -> Series {
        match group.kind {
            GroupKind::Fixed => Series {
                files: self
                    .probe_file(group, period, None)
                    .await
                    .found()
                    .into_iter()
                    .collect(),
                interrupted: false,
            },
            GroupKind::Iterable { iteration_bound } => {
                let mut files = Vec::new();
                for index in 0..iteration_bound {
                    match self.probe_file(group, period, Some(index)).await {
                        Candidate::Found(file) => files.push(file),
                        Candidate::Missing => {
                            return Series {
                                files,
                                interrupted: false,
                            };
                        }
                        Candidate::Unreachable => {
                            let interrupted = !files.is_empty();
                            if interrupted {
                                warn!(
                                    group = %group.id,
                                    %period,
                                    index,
                                    "series cut short by an unreachable candidate"
                                );
                            }
                            return Series { files, interrupted };
                        }
                    }
                }
                warn!(
                    group = %group.id,
                    %period,
                    iteration_bound,
                    "iteration bound reached; later indices not probed"
                );
                Series {
                    files,
                    interrupted: false,
                }
            }
        }
    }

    async fn probe_file(
        &self,
        group: &DocumentGroup,
        period: Period,
        index: Option<u32>,
    ) -> Candidate {
        let url = match group.candidate_url(&self.base_url, period, index) {
            Ok(url) => url,
            Err(e) => {
                error!(group = %group.id, %period, index, error = %e, "invalid candidate URL");
                return Candidate::Missing;
            }
        };

        let outcome = self.oracle.probe(&url).await;
        info!(
            group = %group.id,
            %period,
            index,
            url = %url,
            oracle = self.oracle.name(),
            outcome = ?outcome,
            "probe"
        );
        match outcome {
            ProbeOutcome::Found => Candidate::Found(ResolvedFile { index, url }),
            ProbeOutcome::Missing => Candidate::Missing,
            ProbeOutcome::Unreachable { reason } => {
                warn!(
                    group = %group.id,
                    %period,
                    index,
                    url = %url,
                    reason = %reason,
                    "candidate unreachable after retries; treated as missing"
                );
                Candidate::Unreachable
            }
        }
    }
}

/// Files found for one period of one group.
struct Series {
    files: Vec<ResolvedFile>,
    /// An unreachable candidate ended the series after at least one file.
    interrupted: bool,
}

enum Candidate {
    Found(ResolvedFile),
    Missing,
    Unreachable,
}

impl Candidate {
    fn found(self) -> Option<ResolvedFile> {
        match self {
            Self::Found(file) => Some(file),
            Self::Missing | Self::Unreachable => None,
        }
    }
}
