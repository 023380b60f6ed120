//! Retry logic with exponential backoff for transient request failures.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types for
//! classifying errors and determining retry behavior, plus [`with_retry`],
//! the loop shared by existence probes and downloads.
//!
//! # Overview
//!
//! When a request fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - Temporary failures that may succeed on retry
//! - [`FailureType::Permanent`] - Failures that won't succeed regardless of retries
//! - [`FailureType::RateLimited`] - Server rate limiting (retries with backoff)
//!
//! A 404 is permanent, which is what lets the revision search treat it as a
//! definitive "not published" answer while a flaky connection is retried.
//!
//! # Example
//!
//! ```
//! use aip_core::download::{
//!     DownloadError, RetryPolicy, RetryDecision, classify_error
//! };
//!
//! let policy = RetryPolicy::default();
//! let error = DownloadError::http_status("https://example.com/Gen0.pdf", 503);
//! let failure_type = classify_error(&error);
//!
//! match policy.should_retry(failure_type, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::DownloadError;

/// Default maximum download attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default maximum existence-probe attempts (one retry).
pub const DEFAULT_PROBE_ATTEMPTS: u32 = 2;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Probe backoff: short, since a probe sweep issues many requests.
const PROBE_BASE_DELAY: Duration = Duration::from_millis(250);
const PROBE_MAX_DELAY: Duration = Duration::from_secs(2);
const PROBE_MAX_JITTER: Duration = Duration::from_millis(100);

/// Classification of request failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: network timeout, 5xx server errors, connection refused.
    Transient,

    /// Permanent failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, 403 Forbidden, undersized bodies.
    Permanent,

    /// Server rate limiting (HTTP 429).
    RateLimited,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `base_delay`: 1 second
/// - `max_delay`: 32 seconds
/// - `backoff_multiplier`: 2.0
/// - `max_jitter`: 500 ms
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt (typically 2.0 for doubling).
    backoff_multiplier: f32,

    /// Upper bound of the random jitter added to each delay.
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (clamped to >= 1)
    /// * `base_delay` - Base delay for first retry
    /// * `max_delay` - Maximum delay cap
    /// * `backoff_multiplier` - Multiplier for exponential increase
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
            max_jitter: MAX_JITTER,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Short, fast policy for existence probes.
    #[must_use]
    pub fn probe(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: PROBE_BASE_DELAY,
            max_delay: PROBE_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: PROBE_MAX_JITTER,
        }
    }

    /// Replaces the jitter bound (zero disables jitter).
    #[must_use]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry a failed request.
    ///
    /// `attempt` is the attempt number that just failed (1-indexed).
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Formula: `min(base_delay * multiplier^(attempt-1), max_delay) + jitter`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);

        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=max_ms);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies an error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | HTTP 408, 5xx | Transient |
/// | HTTP 429 | RateLimited |
/// | Other HTTP 4xx | Permanent |
/// | Timeout | Transient |
/// | Network (TLS) | Permanent |
/// | Network (other) | Transient |
/// | Integrity | Transient (truncated transfer) |
/// | TooSmall, Io, ClientBuild | Permanent |
#[instrument]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::HttpStatus { status, .. } => classify_http_status(*status),
        DownloadError::Timeout { .. } | DownloadError::Integrity { .. } => FailureType::Transient,
        DownloadError::Network { source, .. } => {
            if is_tls_error(source) {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }
        DownloadError::TooSmall { .. }
        | DownloadError::Io { .. }
        | DownloadError::ClientBuild { .. } => FailureType::Permanent,
    }
}

#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> FailureType {
    match status {
        408 => FailureType::Transient,
        429 => FailureType::RateLimited,
        status if (400..500).contains(&status) => FailureType::Permanent,
        status if (500..600).contains(&status) => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}

/// Runs `operation` until it succeeds or the policy gives up.
///
/// # Returns
///
/// - `Ok((value, attempts))` on success
/// - `Err((error, attempts))` with the last error once retries are exhausted
///   or the failure is permanent
///
/// # Errors
///
/// Returns the final [`DownloadError`] together with the attempt count.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<(T, u32), (DownloadError, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok((value, attempt)),
            Err(error) => match policy.should_retry(classify_error(&error), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    debug!(
                        url,
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url, %reason, "not retrying request");
                    return Err((error, attempt));
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(32));
        assert!((policy.backoff_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        let policy = RetryPolicy::with_max_attempts(0);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(RetryPolicy::probe(0).max_attempts(), 1);
    }

    #[test]
    fn test_probe_policy_is_short() {
        let policy = RetryPolicy::probe(DEFAULT_PROBE_ATTEMPTS);
        assert_eq!(policy.max_attempts(), 2);
        let delay = policy.calculate_delay(1);
        assert!(delay >= Duration::from_millis(250));
        assert!(delay <= Duration::from_millis(350));
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_calculation_grows_exponentially() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(32), 2.0)
            .with_jitter(Duration::ZERO);
        assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_delay(2), Duration::from_secs(2));
        assert_eq!(policy.calculate_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_calculation_respects_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        let delay = policy.calculate_delay(6);
        assert!(delay >= Duration::from_secs(5));
        assert!(delay <= Duration::from_millis(5500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            assert!(policy.calculate_jitter() <= MAX_JITTER);
        }
    }

    // ==================== Decision Tests ====================

    #[test]
    fn test_should_retry_transient_until_exhausted() {
        let policy = RetryPolicy::with_max_attempts(3);
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::RateLimited, 2),
            RetryDecision::Retry { attempt: 3, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 3),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_should_not_retry_permanent() {
        let policy = RetryPolicy::with_max_attempts(5);
        match policy.should_retry(FailureType::Permanent, 1) {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("permanent")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_classify_http_statuses() {
        let classify = |status| classify_error(&DownloadError::http_status("u", status));
        assert_eq!(classify(404), FailureType::Permanent);
        assert_eq!(classify(410), FailureType::Permanent);
        assert_eq!(classify(403), FailureType::Permanent);
        assert_eq!(classify(408), FailureType::Transient);
        assert_eq!(classify(429), FailureType::RateLimited);
        assert_eq!(classify(500), FailureType::Transient);
        assert_eq!(classify(503), FailureType::Transient);
        assert_eq!(classify(302), FailureType::Permanent);
    }

    #[test]
    fn test_classify_non_http_errors() {
        assert_eq!(
            classify_error(&DownloadError::timeout("u")),
            FailureType::Transient
        );
        assert_eq!(
            classify_error(&DownloadError::too_small("u", 10, 1024)),
            FailureType::Permanent
        );
        assert_eq!(
            classify_error(&DownloadError::integrity("u", 10, 5)),
            FailureType::Transient
        );
    }

    // ==================== with_retry Tests ====================

    #[tokio::test]
    async fn test_with_retry_recovers_from_transient_failure() {
        let policy = RetryPolicy::probe(3).with_jitter(Duration::ZERO);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&policy, "u", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DownloadError::http_status("u", 503))
            } else {
                Ok("body")
            }
        })
        .await;
        assert_eq!(result.unwrap(), ("body", 2));
    }

    #[tokio::test]
    async fn test_with_retry_stops_on_permanent_failure() {
        let policy = RetryPolicy::probe(3);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<((), u32), _> = with_retry(&policy, "u", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DownloadError::http_status("u", 404))
        })
        .await;
        let (error, attempts) = result.unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_max_attempts() {
        let policy = RetryPolicy::probe(2).with_jitter(Duration::ZERO);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<((), u32), _> = with_retry(&policy, "u", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DownloadError::timeout("u"))
        })
        .await;
        assert_eq!(result.unwrap_err().1, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
