//! Bounded fan-out of availability checks.
//!
//! Every candidate goes through the checker with at most `concurrency`
//! lookups in flight. A slot frees up as soon as its lookup finishes, so one
//! slow registry answer does not stall the others. Checks finish in any
//! order, but the returned verdicts line up with the input: `verdicts[i]`
//! belongs to `candidates[i]`.

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::checker::AvailabilityChecker;
use crate::types::{Verdict, MAX_CONCURRENCY};

/// Receives `(completed, total)` after each finished check.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Runs a checker over a whole candidate list.
#[derive(Clone)]
pub struct SweepRunner {
    checker: AvailabilityChecker,
    concurrency: usize,
}

impl SweepRunner {
    /// Create a runner; `concurrency` is clamped to 1..=100.
    pub fn new(checker: AvailabilityChecker, concurrency: usize) -> Self {
        Self {
            checker,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check every candidate without progress reporting.
    pub async fn run(&self, candidates: &[String]) -> Vec<Verdict> {
        self.run_with_progress(candidates, &|_: usize, _: usize| {}).await
    }

    /// Check every candidate, reporting progress as checks complete.
    ///
    /// The result always has `candidates.len()` entries in input order.
    pub async fn run_with_progress(&self, candidates: &[String], progress: &dyn ProgressSink) -> Vec<Verdict> {
        let total = candidates.len();
        let completed = AtomicUsize::new(0);
        let start_time = Instant::now();

        // Completion order is arbitrary; each verdict goes back to its slot.
        let mut slots: Vec<Option<Verdict>> = vec![None; total];
        let mut finished = stream::iter(candidates.iter().enumerate())
            .map(|(index, domain)| {
                let completed = &completed;
                async move {
                    let verdict = self.checker.check(domain).await;
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.on_progress(done, total);
                    (index, verdict)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((index, verdict)) = finished.next().await {
            slots[index] = Some(verdict);
        }

        let verdicts: Vec<Verdict> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Verdict::Failed {
                    reason: "check never completed".to_string(),
                })
            })
            .collect();

        let failed = verdicts.iter().filter(|v| v.is_failed()).count();
        tracing::info!(
            candidates = total,
            available = verdicts.iter().filter(|v| v.is_available()).count(),
            failed,
            concurrency = self.concurrency,
            duration_ms = %start_time.elapsed().as_millis(),
            "Sweep completed"
        );

        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainSweepError;
    use crate::protocols::WhoisLookup;
    use crate::types::WhoisRecord;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Earlier names sleep longer, so completion order is reversed.
    /// Names starting with 'a' are free, names with 'x' fail, the rest are taken.
    struct ReversingLookup {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl ReversingLookup {
        fn new() -> Self {
            Self {
                in_flight: Arc::new(AtomicUsize::new(0)),
                max_in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl WhoisLookup for ReversingLookup {
        async fn lookup(&self, domain: &str, _timeout: Duration) -> Result<WhoisRecord, DomainSweepError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let first = domain.chars().next().unwrap_or('a');
            let delay = (b'z' - first as u8) as u64 * 2;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if first == 'x' {
                return Err(DomainSweepError::network("connection reset"));
            }
            if domain.starts_with('a') {
                Ok(WhoisRecord::default())
            } else {
                Ok(WhoisRecord {
                    domain_name: Some(domain.to_string()),
                    ..Default::default()
                })
            }
        }
    }

    fn candidates() -> Vec<String> {
        crate::generate::generate_candidates(1, ".zz").unwrap()
    }

    #[tokio::test]
    async fn test_verdicts_align_with_candidates() {
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(ReversingLookup::new()), 8);
        let candidates = candidates();
        let verdicts = runner.run(&candidates).await;

        assert_eq!(verdicts.len(), candidates.len());
        for (domain, verdict) in candidates.iter().zip(&verdicts) {
            let expected = match domain.chars().next() {
                Some('a') => Verdict::Available,
                Some('x') => Verdict::Failed {
                    reason: "Network error: connection reset".to_string(),
                },
                _ => Verdict::Taken,
            };
            assert_eq!(verdict, &expected, "verdict mismatch for {}", domain);
        }
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let lookup = ReversingLookup::new();
        let max_in_flight = lookup.max_in_flight.clone();
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(lookup), 3);

        runner.run(&candidates()).await;

        let observed = max_in_flight.load(Ordering::SeqCst);
        assert!(observed <= 3, "saw {} lookups in flight", observed);
        assert!(observed > 1, "lookups never overlapped");
    }

    #[tokio::test]
    async fn test_progress_reports_every_completion() {
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(ReversingLookup::new()), 5);
        let seen = Mutex::new(Vec::new());
        let candidates = candidates();

        runner
            .run_with_progress(&candidates, &|done: usize, total: usize| {
                seen.lock().unwrap().push((done, total));
            })
            .await;

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), candidates.len());
        assert!(seen.iter().all(|&(_, total)| total == candidates.len()));
        let mut done: Vec<usize> = seen.iter().map(|&(d, _)| d).collect();
        done.sort_unstable();
        assert_eq!(done, (1..=candidates.len()).collect::<Vec<_>>());
    }

    /// Every tenth name is slow; the rest answer almost at once.
    struct StragglerLookup;

    #[async_trait]
    impl WhoisLookup for StragglerLookup {
        async fn lookup(&self, domain: &str, _timeout: Duration) -> Result<WhoisRecord, DomainSweepError> {
            let index: usize = domain.trim_end_matches(".zz").parse().unwrap_or(0);
            let delay = if index % 10 == 0 { 300 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(WhoisRecord::default())
        }
    }

    #[tokio::test]
    async fn test_slow_lookup_does_not_stall_free_slots() {
        let candidates: Vec<String> = (0..100).map(|i| format!("{}.zz", i)).collect();
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(StragglerLookup), 10);

        let started = Instant::now();
        let verdicts = runner.run(&candidates).await;
        let elapsed = started.elapsed();

        assert_eq!(verdicts.len(), 100);
        assert!(verdicts.iter().all(Verdict::is_available));
        // A pool that keeps every slot busy needs about 350ms here; waiting
        // on the oldest lookup before starting new ones takes about 3s.
        assert!(elapsed < Duration::from_millis(1500), "sweep took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(ReversingLookup::new()), 4);
        assert!(runner.run(&[]).await.is_empty());
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(ReversingLookup::new()), 0);
        assert_eq!(runner.concurrency(), 1);
        let runner = SweepRunner::new(AvailabilityChecker::with_lookup(ReversingLookup::new()), 1000);
        assert_eq!(runner.concurrency(), MAX_CONCURRENCY);
    }
}
