//! Utility functions for input handling and path resolution.

use crate::error::DomainSweepError;
use crate::types::{DEFAULT_OUTPUT_FILE, DEFAULT_SUFFIX};
use std::env;
use std::path::PathBuf;

/// Normalize a user-supplied suffix into `.tld` form.
///
/// Blank input falls back to `.com`, a missing leading dot is added and the
/// result is lowercased. Anything that is not a simple dotted label
/// sequence is rejected.
///
/// # Examples
///
/// ```
/// use domain_sweep_lib::normalize_suffix;
///
/// assert_eq!(normalize_suffix("").unwrap(), ".com");
/// assert_eq!(normalize_suffix("IO").unwrap(), ".io");
/// assert_eq!(normalize_suffix(".co.uk").unwrap(), ".co.uk");
/// assert!(normalize_suffix("c om").is_err());
/// ```
pub fn normalize_suffix(raw: &str) -> Result<String, DomainSweepError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_SUFFIX.to_string());
    }

    let lowered = trimmed.to_lowercase();
    let suffix = if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{}", lowered)
    };

    for label in suffix[1..].split('.') {
        if label.is_empty() {
            return Err(DomainSweepError::invalid_suffix(
                raw,
                "suffix contains an empty label",
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainSweepError::invalid_suffix(
                raw,
                "labels cannot start or end with a hyphen",
            ));
        }
        if let Some(bad) = label
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(DomainSweepError::invalid_suffix(
                raw,
                format!("unsupported character '{}'", bad),
            ));
        }
    }

    Ok(suffix)
}

/// Parse the domain length typed at the prompt or passed on the command line.
pub fn parse_length(raw: &str) -> Result<usize, DomainSweepError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<usize>()
        .map_err(|e| DomainSweepError::invalid_input(trimmed, format!("expected a whole number: {}", e)))
}

/// Extract the last label of a domain name ("ab.com" -> "com").
pub fn extract_tld(domain: &str) -> Option<String> {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|tld| !tld.is_empty() && domain.contains('.'))
        .map(|tld| tld.to_lowercase())
}

/// The user's home directory, if the environment exposes one.
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Default destination: `com.txt` on the user's desktop.
///
/// Falls back to the current directory when no home directory is known.
pub fn default_output_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join("Desktop").join(DEFAULT_OUTPUT_FILE),
        None => PathBuf::from(DEFAULT_OUTPUT_FILE),
    }
}

/// Expand a leading `~/` in a user-supplied path.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_suffix() {
        assert_eq!(normalize_suffix(".com").unwrap(), ".com");
        assert_eq!(normalize_suffix("  .IO ").unwrap(), ".io");
        assert_eq!(normalize_suffix("net").unwrap(), ".net");
        assert_eq!(normalize_suffix("   ").unwrap(), ".com");
        assert_eq!(normalize_suffix("xn--p1ai").unwrap(), ".xn--p1ai");
    }

    #[test]
    fn test_normalize_suffix_rejects_garbage() {
        assert!(normalize_suffix(".").is_err());
        assert!(normalize_suffix("co..uk").is_err());
        assert!(normalize_suffix(".c_m").is_err());
        assert!(normalize_suffix(".-io").is_err());
        assert!(normalize_suffix("c om").is_err());
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("3").unwrap(), 3);
        assert_eq!(parse_length(" 4\n").unwrap(), 4);
        assert!(parse_length("").is_err());
        assert!(parse_length("four").is_err());
        assert!(parse_length("-1").is_err());
    }

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("ab.com"), Some("com".to_string()));
        assert_eq!(extract_tld("ab.co.UK"), Some("uk".to_string()));
        assert_eq!(extract_tld("ab.io."), Some("io".to_string()));
        assert_eq!(extract_tld("localhost"), None);
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("out/com.txt"), PathBuf::from("out/com.txt"));
    }
}
