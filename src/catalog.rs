//! Static catalog of the AIP document groups.
//!
//! The publication is split into six groups. Their declaration order in
//! [`GroupId`] is the order in which they appear in the compiled document.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::period::Period;

/// Publisher location of the monthly AIP folders.
pub const DEFAULT_BASE_URL: &str = "https://www.dinacia.gub.uy/sites/default/files/aip/";

/// Default maximum number of indices probed for an iterable group.
pub const DEFAULT_ITERATION_BOUND: u32 = 64;

/// Placeholder replaced by the file index in iterable filename patterns.
const INDEX_PLACEHOLDER: &str = "{n}";

/// Logical document group. Variant order is assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupId {
    Heading,
    General,
    EnRoute,
    Aerodromes,
    #[serde(rename = "Additional_Aerodromes")]
    AdditionalAerodromes,
    Amendment,
}

impl GroupId {
    /// All groups in assembly order.
    pub const ALL: [GroupId; 6] = [
        GroupId::Heading,
        GroupId::General,
        GroupId::EnRoute,
        GroupId::Aerodromes,
        GroupId::AdditionalAerodromes,
        GroupId::Amendment,
    ];

    /// Stable name used in logs and part file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "Heading",
            Self::General => "General",
            Self::EnRoute => "EnRoute",
            Self::Aerodromes => "Aerodromes",
            Self::AdditionalAerodromes => "Additional_Aerodromes",
            Self::Amendment => "Amendment",
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a group is a numbered series or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Files `0..k` whose count is discovered by probing, up to `iteration_bound`.
    Iterable { iteration_bound: u32 },
    /// Exactly one file per period.
    Fixed,
}

/// A named document group and the filename pattern its files follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    pub id: GroupId,
    pub kind: GroupKind,
    /// `Gen{n}.pdf` style for iterable groups, a literal name for fixed ones.
    pub filename_pattern: String,
}

impl DocumentGroup {
    #[must_use]
    pub fn iterable(id: GroupId, filename_pattern: impl Into<String>, iteration_bound: u32) -> Self {
        Self {
            id,
            kind: GroupKind::Iterable { iteration_bound },
            filename_pattern: filename_pattern.into(),
        }
    }

    #[must_use]
    pub fn fixed(id: GroupId, filename: impl Into<String>) -> Self {
        Self {
            id,
            kind: GroupKind::Fixed,
            filename_pattern: filename.into(),
        }
    }

    #[must_use]
    pub fn is_iterable(&self) -> bool {
        matches!(self.kind, GroupKind::Iterable { .. })
    }

    /// Filename for the given index. Fixed groups ignore the index.
    #[must_use]
    pub fn filename(&self, index: Option<u32>) -> String {
        match (self.kind, index) {
            (GroupKind::Iterable { .. }, Some(n)) => self
                .filename_pattern
                .replace(INDEX_PLACEHOLDER, &n.to_string()),
            _ => self.filename_pattern.clone(),
        }
    }

    /// Candidate URL `<base>/<YYYY-MM>/<filename>`.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the joined path is not a valid URL.
    pub fn candidate_url(
        &self,
        base: &Url,
        period: Period,
        index: Option<u32>,
    ) -> Result<Url, url::ParseError> {
        base.join(&format!("{period}/{}", self.filename(index)))
    }
}

/// The full set of groups compiled in one run, in assembly order.
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<DocumentGroup>,
}

impl Catalog {
    /// Builds a catalog; groups are sorted into assembly order.
    #[must_use]
    pub fn new(mut groups: Vec<DocumentGroup>) -> Self {
        groups.sort_by_key(|group| group.id);
        Self { groups }
    }

    /// The publisher's layout.
    ///
    /// Iterable series: `Gen{n}`, `Enr{n}`, `Ad{n}`, `Ad2-{n}`. Fixed files:
    /// `AIPHEAD.pdf` (cover and list of contents) and `AIPAMDT.pdf`
    /// (amendment record).
    #[must_use]
    pub fn standard(iteration_bound: u32) -> Self {
        Self::new(vec![
            DocumentGroup::fixed(GroupId::Heading, "AIPHEAD.pdf"),
            DocumentGroup::iterable(GroupId::General, "Gen{n}.pdf", iteration_bound),
            DocumentGroup::iterable(GroupId::EnRoute, "Enr{n}.pdf", iteration_bound),
            DocumentGroup::iterable(GroupId::Aerodromes, "Ad{n}.pdf", iteration_bound),
            DocumentGroup::iterable(
                GroupId::AdditionalAerodromes,
                "Ad2-{n}.pdf",
                iteration_bound,
            ),
            DocumentGroup::fixed(GroupId::Amendment, "AIPAMDT.pdf"),
        ])
    }

    #[must_use]
    pub fn groups(&self) -> &[DocumentGroup] {
        &self.groups
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard(DEFAULT_ITERATION_BOUND)
    }
}

/// Parses a base URL and guarantees a trailing slash so period folders join
/// beneath it rather than replacing its last segment.
///
/// # Errors
///
/// Returns a parse error when `raw` is not an absolute URL.
pub fn normalize_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}
