//! Error types for PDF assembly.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while merging fetched documents.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A fetched body could not be used; the asset is skipped.
    #[error("skipping asset #{ordinal} ({label}): {reason}")]
    InvalidAsset {
        /// Ordinal of the asset in the compilation.
        ordinal: usize,
        /// Group label such as `General[2]`.
        label: String,
        reason: String,
    },

    /// No asset could be merged.
    #[error("no assets could be merged")]
    Empty,

    /// The merged document could not be serialised.
    #[error("failed to serialise merged PDF: {0}")]
    Serialize(#[source] std::io::Error),

    /// The merged document could not be written.
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssemblyError {
    pub(crate) fn invalid_asset(ordinal: usize, label: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidAsset {
            ordinal,
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}
