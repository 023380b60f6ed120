//! Constants for the download module (timeouts, size floor).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout (60 seconds; AIP volumes are a few MB).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Bodies below this size are error pages, not AIP volumes (1 KiB).
pub const DEFAULT_MIN_FILE_SIZE: u64 = 1024;
