//! Core data types for domain sweeps.
//!
//! This module defines the verdict produced for each candidate, the sweep
//! configuration, the structured WHOIS record and the end-of-run summary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::default_output_path;

/// Suffix used when the user leaves it blank.
pub const DEFAULT_SUFFIX: &str = ".com";

/// File name the available domains are written to, whatever the suffix.
pub const DEFAULT_OUTPUT_FILE: &str = "com.txt";

/// Lookups in flight at once unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound for the concurrency limit.
pub const MAX_CONCURRENCY: usize = 100;

/// Per-lookup WHOIS timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Classification of one candidate.
///
/// `Failed` keeps lookup problems visible to callers that want them;
/// [`Verdict::is_available`] collapses it to the conservative boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verdict {
    /// The registry has no record of the domain
    Available,

    /// The registry returned a registered domain name
    Taken,

    /// Lookup, parse or timeout failure
    Failed { reason: String },
}

impl Verdict {
    /// `true` only for a successful lookup that found no registration.
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Verdict::Failed { .. })
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Available => write!(f, "available"),
            Verdict::Taken => write!(f, "taken"),
            Verdict::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Structured WHOIS response.
///
/// Only the fields a sweep cares about are extracted; `domain_name` is the
/// one that decides availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Registered domain name as reported by the registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Domain status codes (e.g., "clientTransferProhibited")
    pub status: Vec<String>,

    pub name_servers: Vec<String>,

    /// Server that answered the query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,
}

impl WhoisRecord {
    /// A record without a registered domain name means the domain is free.
    pub fn is_registered(&self) -> bool {
        self.domain_name.is_some()
    }
}

/// Settings for one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Number of letters before the suffix
    pub length: usize,

    /// Normalized suffix, always starting with '.'
    pub suffix: String,

    /// File the available domains are written to
    pub output: PathBuf,

    /// Maximum number of lookups in flight
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Timeout for each individual WHOIS lookup
    /// Default: 10 seconds
    #[serde(skip)]
    pub timeout: Duration,
}

impl SweepConfig {
    /// Create a configuration for `length`-letter names under `suffix`.
    ///
    /// The suffix is stored as given; callers normalize it with
    /// [`crate::normalize_suffix`] first.
    pub fn new<S: Into<String>>(length: usize, suffix: S) -> Self {
        Self {
            length,
            suffix: suffix.into(),
            output: default_output_path(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom concurrency limit.
    ///
    /// Clamped to 1..=100 to keep resource usage bounded.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the per-lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the destination file.
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }
}

/// A candidate whose lookup did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCheck {
    pub domain: String,
    pub reason: String,
}

/// Aggregate outcome of a finished sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    pub failed: usize,
    /// Wall-clock time of the whole sweep
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    pub output: PathBuf,
    /// Failed candidates in generation order; none of them are in the file
    pub failures: Vec<FailedCheck>,
}

impl SweepSummary {
    /// Tally order-matched candidates and verdicts into a summary.
    pub fn from_results(candidates: &[String], verdicts: &[Verdict], elapsed: Duration, output: PathBuf) -> Self {
        let mut summary = Self {
            total: verdicts.len(),
            available: 0,
            taken: 0,
            failed: 0,
            elapsed,
            output,
            failures: Vec::new(),
        };

        for (domain, verdict) in candidates.iter().zip(verdicts) {
            match verdict {
                Verdict::Available => summary.available += 1,
                Verdict::Taken => summary.taken += 1,
                Verdict::Failed { reason } => {
                    summary.failed += 1;
                    summary.failures.push(FailedCheck {
                        domain: domain.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        summary
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
