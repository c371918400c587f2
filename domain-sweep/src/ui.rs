//! Display logic for the domain-sweep CLI.
//!
//! Header, live progress counter, completion message and summaries. The
//! progress line goes to stderr so stdout stays clean for `--json`.

use console::{style, Term};
use domain_sweep_lib::{FailedCheck, SweepSummary};
use std::path::Path;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a sweep.
pub fn print_header(length: usize, suffix: &str, total: usize, concurrency: usize, output: &Path) {
    println!(
        "{} {} {}",
        style("domain-sweep").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Sweeping {} {}-letter {} domain{}",
            total,
            length,
            suffix,
            if total == 1 { "" } else { "s" }
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!("Concurrency: {} | Output: {}", concurrency, output.display())).dim()
    );
    println!();
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// A single `[completed/total]` line rewritten in place on stderr.
///
/// Does nothing when stderr is not a terminal.
pub struct ProgressLine {
    enabled: bool,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self {
            enabled: Term::stderr().is_term(),
        }
    }

    pub fn update(&self, completed: usize, total: usize) {
        if !self.enabled {
            return;
        }
        let term = Term::stderr();
        let _ = term.clear_line();
        let _ = term.write_str(&format_progress(completed, total));
    }

    /// Clear the progress line.
    pub fn finish(&self) {
        if self.enabled {
            let _ = Term::stderr().clear_line();
        }
    }
}

fn format_progress(completed: usize, total: usize) -> String {
    format!("{} checking...", style(format!("[{}/{}]", completed, total)).cyan())
}

// ── Completion and summary ───────────────────────────────────────────────────

/// Print where the available domains went.
pub fn print_completion(written: usize, output: &Path) {
    println!(
        "{} Sweep complete: {} available domain{} written to {}",
        style("✓").green().bold(),
        style(written).bold(),
        if written == 1 { "" } else { "s" },
        style(output.display()).underlined(),
    );
}

/// Print the final summary bar with colored counts.
pub fn print_summary(summary: &SweepSummary) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(summary.total).bold(),
        if summary.total == 1 { "" } else { "s" },
        summary.elapsed.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!("{} failed", summary.failed)).yellow(),
    );
}

/// Print which domains could not be checked, grouped by cause.
///
/// Failed domains are not in the output file; rerunning them is up to the
/// user.
pub fn print_failure_summary(failures: &[FailedCheck]) {
    let groups = group_failures(failures);
    if groups.is_empty() {
        return;
    }

    println!();
    println!("  {}", style("Some domains could not be checked:").yellow());
    for (label, domains) in &groups {
        println!(
            "  {} {} {}: {}",
            style("•").dim(),
            domains.len(),
            label,
            format_domain_list(domains, 5),
        );
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Bucket failed domains by a short cause label, keeping first-seen order.
fn group_failures(failures: &[FailedCheck]) -> Vec<(&'static str, Vec<&str>)> {
    let mut groups: Vec<(&'static str, Vec<&str>)> = Vec::new();

    for failure in failures {
        let label = brief_reason(&failure.reason);
        let domain = failure.domain.as_str();
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, domains)) => domains.push(domain),
            None => groups.push((label, vec![domain])),
        }
    }

    groups
}

/// Classify a failure reason into a short label.
fn brief_reason(reason: &str) -> &'static str {
    let r = reason.to_lowercase();
    if r.contains("timeout") || r.contains("timed out") {
        "timeouts"
    } else if r.contains("rate limit") {
        "rate limited"
    } else if r.contains("network") || r.contains("connect") {
        "network errors"
    } else if r.contains("parse") || r.contains("unable to determine") {
        "unreadable responses"
    } else if r.contains("whois server") || r.contains("tld") {
        "unsupported TLDs"
    } else {
        "other errors"
    }
}

fn format_domain_list(domains: &[&str], max_show: usize) -> String {
    if domains.len() <= max_show {
        domains.join(", ")
    } else {
        let remaining = domains.len() - max_show;
        format!("{}, ... and {} more", domains[..max_show].join(", "), remaining)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(domain: &str, reason: &str) -> FailedCheck {
        FailedCheck {
            domain: domain.to_string(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_brief_reason() {
        assert_eq!(brief_reason("Timeout: WHOIS lookup exceeded 10s"), "timeouts");
        assert_eq!(brief_reason("Rate limited by whois.nic.io: try later"), "rate limited");
        assert_eq!(brief_reason("Network error: connection refused"), "network errors");
        assert_eq!(brief_reason("Parse error for ab.com: empty WHOIS response"), "unreadable responses");
        assert_eq!(brief_reason("something odd"), "other errors");
    }

    #[test]
    fn test_group_failures_keeps_order() {
        let failures = vec![
            failed("a.io", "Network error: reset"),
            failed("c.io", "Timeout: WHOIS lookup"),
            failed("d.io", "Network error: refused"),
        ];

        let groups = group_failures(&failures);
        assert_eq!(
            groups,
            vec![("network errors", vec!["a.io", "d.io"]), ("timeouts", vec!["c.io"])]
        );
    }

    #[test]
    fn test_group_failures_empty_when_all_checked() {
        assert!(group_failures(&[]).is_empty());
    }

    #[test]
    fn test_format_domain_list_truncates() {
        let domains = vec!["a.io", "b.io", "c.io"];
        assert_eq!(format_domain_list(&domains, 5), "a.io, b.io, c.io");
        assert_eq!(format_domain_list(&domains, 2), "a.io, b.io, ... and 1 more");
    }

    #[test]
    fn test_format_progress_contains_counter() {
        assert!(format_progress(3, 26).contains("[3/26]"));
    }
}
