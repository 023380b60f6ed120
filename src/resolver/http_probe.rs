//! HTTP-backed existence oracle.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::{ExistenceOracle, ProbeOutcome};
use crate::download::{FailureType, HttpClient, RetryPolicy, classify_error, with_retry};

/// Probes candidates with `HEAD`, retrying transient failures.
///
/// A permanent status (404, 410, 403, ...) is a definitive "missing". A
/// failure that is still transient after the retry budget is reported as
/// [`ProbeOutcome::Unreachable`] so the log shows it was not a clean 404.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: HttpClient,
    policy: RetryPolicy,
}

impl HttpProbe {
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl ExistenceOracle for HttpProbe {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn probe(&self, url: &Url) -> ProbeOutcome {
        let url = url.as_str();
        let client = &self.client;
        match with_retry(&self.policy, url, move || async move { client.probe(url).await }).await
        {
            Ok(((), attempts)) => {
                debug!(url, attempts, "candidate exists");
                ProbeOutcome::Found
            }
            Err((error, attempts)) => match classify_error(&error) {
                FailureType::Permanent => {
                    if error.is_not_found() {
                        debug!(url, attempts, "candidate missing");
                    } else {
                        warn!(url, attempts, error = %error, "candidate rejected; treated as missing");
                    }
                    ProbeOutcome::Missing
                }
                FailureType::Transient | FailureType::RateLimited => {
                    debug!(url, attempts, error = %error, "candidate unreachable");
                    ProbeOutcome::Unreachable {
                        reason: error.to_string(),
                    }
                }
            },
        }
    }
}
