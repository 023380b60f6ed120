//! AIP Compiler Core Library
//!
//! This library finds the newest published revision of every part of the
//! Uruguayan Aeronautical Information Publication, downloads the parts in
//! parallel and merges them into a single PDF.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`period`] - Year-month values and the backward lookback window
//! - [`catalog`] - Document groups, filename patterns and candidate URLs
//! - [`resolver`] - Revision discovery through an existence oracle
//! - [`download`] - HTTP client, retry policy and the concurrent fetch engine
//! - [`pdf`] - Merging fetched documents into one PDF
//! - [`compile`] - The end-to-end pipeline and its run report

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod compile;
pub mod download;
pub mod pdf;
pub mod period;
pub mod resolver;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Catalog, DocumentGroup, GroupId, GroupKind};
pub use compile::{CompileError, CompileReport, CompileSettings, Compiler, output_file_name};
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DownloadError, DownloadedAsset, EngineError,
    FailureType, FetchEngine, FetchStats, FetchTask, HttpClient, RetryDecision, RetryPolicy,
    classify_error, plan_fetches,
};
pub use pdf::{AssemblyError, MergedPdf, merge_assets};
pub use period::{Lookback, Period};
pub use resolver::{
    ExistenceOracle, HttpProbe, ProbeOutcome, Resolution, ResolvedDocument, ResolvedFile,
    RevisionResolver,
};
