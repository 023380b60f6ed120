//! Assembly of fetched documents into the compiled PDF.
//!
//! Assets are merged in the order they are given (ordinal order from the
//! fetch engine). Unreadable assets are skipped; an empty result is an error.

mod error;
mod merge;

pub use error::AssemblyError;
pub use merge::{MergedPdf, merge_assets, write_output};
