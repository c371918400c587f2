//! # Domain Sweep Library
//!
//! Enumerates every lowercase domain of a fixed length under one suffix and
//! checks each one for availability over WHOIS.
//!
//! A sweep has three stages: generate the candidates, run the availability
//! checker over them with bounded concurrency, and write the available
//! ones to a file in generation order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_sweep_lib::{sweep, AvailabilityChecker, SweepConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SweepConfig::new(2, ".io").with_output("io.txt");
//!
//!     let summary = sweep(&config, AvailabilityChecker::new(), &|done: usize, total: usize| {
//!         eprint!("\r[{}/{}]", done, total);
//!     })
//!     .await?;
//!
//!     println!("{} available, written to {}", summary.available, summary.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Exhaustive generation**: all `26^L` names in lexicographic order
//! - **WHOIS over TCP**: built-in servers for common TLDs, IANA referral for the rest
//! - **Bounded fan-out**: explicit concurrency limit, verdicts kept in candidate order
//! - **Honest failures**: errors and timeouts are reported, never counted as available

use std::time::Instant;

// Re-export main public API types and functions
pub use checker::AvailabilityChecker;
pub use concurrent::{ProgressSink, SweepRunner};
pub use config::{
    load_env_config, parse_timeout, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::DomainSweepError;
pub use generate::{candidate_count, generate_candidates};
pub use protocols::{WhoisClient, WhoisLookup};
pub use types::{
    FailedCheck, SweepConfig, SweepSummary, Verdict, WhoisRecord, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_FILE,
    DEFAULT_SUFFIX, DEFAULT_TIMEOUT, MAX_CONCURRENCY,
};
pub use utils::{default_output_path, expand_home, normalize_suffix, parse_length};
pub use writer::ResultWriter;

// Public modules
pub mod generate;
pub mod protocols;

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod types;
mod utils;
mod writer;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainSweepError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a complete sweep: generate, check, write.
///
/// The suffix in `config` is normalized first and the checker's timeout is
/// set to `config.timeout`. The output file is opened before the first
/// lookup, so a bad path fails fast. Individual lookup failures never fail
/// the sweep; they are listed in the summary.
pub async fn sweep(
    config: &SweepConfig,
    checker: AvailabilityChecker,
    progress: &dyn ProgressSink,
) -> Result<SweepSummary> {
    let start_time = Instant::now();
    let suffix = normalize_suffix(&config.suffix)?;
    let candidates = generate_candidates(config.length, &suffix)?;
    let writer = ResultWriter::create(&config.output)?;

    tracing::info!(
        length = config.length,
        suffix = %suffix,
        candidates = candidates.len(),
        concurrency = config.concurrency,
        timeout_ms = %config.timeout.as_millis(),
        "Starting sweep"
    );

    let runner = SweepRunner::new(checker.with_timeout(config.timeout), config.concurrency);
    let verdicts = runner.run_with_progress(&candidates, progress).await;
    writer.write_available(&candidates, &verdicts)?;

    Ok(SweepSummary::from_results(
        &candidates,
        &verdicts,
        start_time.elapsed(),
        config.output.clone(),
    ))
}
