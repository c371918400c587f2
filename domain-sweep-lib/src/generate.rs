//! Candidate generation engine.
//!
//! Produces every lowercase name of a fixed length, each joined with a
//! suffix, in lexicographic order. The whole sequence is materialized up
//! front so the sweep can pair verdicts with candidates by position.
//!
//! # Examples
//!
//! ```
//! use domain_sweep_lib::generate::{candidate_count, generate_candidates};
//!
//! let names = generate_candidates(2, ".io").unwrap();
//! assert_eq!(names.len(), 676);
//! assert_eq!(names.first().map(String::as_str), Some("aa.io"));
//! assert_eq!(names.last().map(String::as_str), Some("zz.io"));
//! assert_eq!(candidate_count(2).unwrap(), 676);
//! ```

use crate::error::DomainSweepError;

/// Letters each position is drawn from.
pub const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Number of candidates for a given length (`26^length`).
///
/// Errors when the count does not fit in `usize`; such a sweep could never
/// be materialized.
pub fn candidate_count(length: usize) -> Result<usize, DomainSweepError> {
    let exponent = u32::try_from(length)
        .map_err(|_| DomainSweepError::generation(format!("length {} is too large", length)))?;

    ALPHABET.len().checked_pow(exponent).ok_or_else(|| {
        DomainSweepError::generation(format!(
            "26^{} candidates cannot be represented on this platform",
            length
        ))
    })
}

/// Generate every `length`-letter candidate under `suffix`.
///
/// Uses an odometer: each position is a base-26 digit, rightmost first.
/// A length of zero yields the single candidate `suffix`.
pub fn generate_candidates(length: usize, suffix: &str) -> Result<Vec<String>, DomainSweepError> {
    let total = candidate_count(length)?;

    let mut candidates = Vec::new();
    candidates
        .try_reserve_exact(total)
        .map_err(|e| DomainSweepError::generation(format!("cannot hold {} candidates: {}", total, e)))?;

    let mut counters = vec![0usize; length];
    let mut name = String::with_capacity(length + suffix.len());

    for _ in 0..total {
        name.clear();
        name.extend(counters.iter().map(|&c| ALPHABET[c]));
        name.push_str(suffix);
        candidates.push(name.clone());

        // Increment odometer (rightmost first)
        for counter in counters.iter_mut().rev() {
            *counter += 1;
            if *counter < ALPHABET.len() {
                break;
            }
            *counter = 0;
        }
    }

    tracing::debug!(length, suffix, count = candidates.len(), "Generated candidates");

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_single_letter() {
        let names = generate_candidates(1, ".com").unwrap();
        assert_eq!(names.len(), 26);
        assert_eq!(names[0], "a.com");
        assert_eq!(names[25], "z.com");
    }

    #[test]
    fn test_two_letters_io() {
        let names = generate_candidates(2, ".io").unwrap();
        assert_eq!(names.len(), 676);
        assert!(names.contains(&"aa.io".to_string()));
        assert!(names.contains(&"zz.io".to_string()));
        assert_eq!(names[1], "ab.io");
        assert_eq!(names[26], "ba.io");
    }

    #[test]
    fn test_counts_lengths_and_suffixes() {
        for length in 1..=3 {
            let names = generate_candidates(length, ".net").unwrap();
            assert_eq!(names.len(), 26usize.pow(length as u32));

            let distinct: HashSet<&String> = names.iter().collect();
            assert_eq!(distinct.len(), names.len());

            for name in &names {
                assert_eq!(name.len(), length + ".net".len());
                assert!(name.ends_with(".net"));
            }
        }
    }

    #[test]
    fn test_lexicographic_order() {
        let names = generate_candidates(3, ".com").unwrap();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_zero_length_is_bare_suffix() {
        let names = generate_candidates(0, ".com").unwrap();
        assert_eq!(names, vec![".com".to_string()]);
    }

    #[test]
    fn test_count_overflow_is_an_error() {
        assert_eq!(candidate_count(4).unwrap(), 456_976);
        assert!(candidate_count(64).is_err());
        assert!(generate_candidates(64, ".com").is_err());
    }
}
