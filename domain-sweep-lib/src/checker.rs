//! Availability checker.
//!
//! Wraps a [`WhoisLookup`] with the per-call timeout and turns whatever it
//! returns into a [`Verdict`]. Errors stop here: they are logged with the
//! domain that caused them and reported as `Verdict::Failed`, so a flaky
//! registry can never produce a false "available".

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::DomainSweepError;
use crate::protocols::{WhoisClient, WhoisLookup};
use crate::types::{Verdict, DEFAULT_TIMEOUT};

/// Classifies single domains as available, taken or failed.
///
/// Cloning is cheap; clones share the underlying lookup.
///
/// # Example
///
/// ```rust,no_run
/// use domain_sweep_lib::AvailabilityChecker;
///
/// #[tokio::main]
/// async fn main() {
///     let checker = AvailabilityChecker::new();
///     let verdict = checker.check("qx.com").await;
///     println!("qx.com: {}", verdict);
/// }
/// ```
#[derive(Clone)]
pub struct AvailabilityChecker {
    lookup: Arc<dyn WhoisLookup>,
    timeout: Duration,
}

impl AvailabilityChecker {
    /// Checker backed by the network WHOIS client and the 10 second timeout.
    pub fn new() -> Self {
        Self::with_lookup(WhoisClient::new())
    }

    /// Checker backed by any lookup implementation.
    pub fn with_lookup<L: WhoisLookup + 'static>(lookup: L) -> Self {
        Self {
            lookup: Arc::new(lookup),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up one domain and classify it.
    ///
    /// Never fails: lookup errors, parse errors and timeouts all come back
    /// as `Verdict::Failed`.
    pub async fn check(&self, domain: &str) -> Verdict {
        let start_time = Instant::now();

        let outcome = tokio::time::timeout(self.timeout, self.lookup.lookup(domain, self.timeout))
            .await
            .unwrap_or_else(|_| Err(DomainSweepError::timeout("WHOIS lookup", self.timeout)));

        match outcome {
            Ok(record) if record.is_registered() => Verdict::Taken,
            Ok(_) => {
                tracing::debug!(
                    domain = %domain,
                    duration_ms = %start_time.elapsed().as_millis(),
                    "No registration found"
                );
                Verdict::Available
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Availability check failed");
                Verdict::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Conservative boolean form of [`check`](Self::check).
    pub async fn is_available(&self, domain: &str) -> bool {
        self.check(domain).await.is_available()
    }
}

impl Default for AvailabilityChecker {
    fn default() -> Self {
        Self::new()
    }
}
