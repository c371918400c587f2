//! Result file output.
//!
//! The destination is opened before any lookup is dispatched, so a bad
//! output path fails the sweep up front instead of after the last verdict.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::DomainSweepError;
use crate::types::Verdict;

/// An opened (and truncated) output file waiting for verdicts.
#[derive(Debug)]
pub struct ResultWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ResultWriter {
    /// Create or truncate `path`, creating missing parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, DomainSweepError> {
        let path = path.as_ref();
        let shown = path.to_string_lossy();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| DomainSweepError::file_error(shown.clone(), format!("Failed to create directory: {}", e)))?;
        }

        let file = File::create(path)
            .map_err(|e| DomainSweepError::file_error(shown.clone(), format!("Failed to create file: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every available candidate, one per line, in input order.
    ///
    /// `verdicts[i]` must belong to `candidates[i]`; a length mismatch is
    /// rejected before anything is written. Returns the number of lines
    /// written.
    pub fn write_available(mut self, candidates: &[String], verdicts: &[Verdict]) -> Result<usize, DomainSweepError> {
        if candidates.len() != verdicts.len() {
            return Err(DomainSweepError::internal(format!(
                "{} candidates but {} verdicts",
                candidates.len(),
                verdicts.len()
            )));
        }

        let shown = self.path.to_string_lossy().into_owned();

        let mut written = 0;
        for (domain, _) in candidates.iter().zip(verdicts).filter(|(_, v)| v.is_available()) {
            writeln!(self.out, "{}", domain)
                .map_err(|e| DomainSweepError::file_error(shown.clone(), format!("Failed to write: {}", e)))?;
            written += 1;
        }

        self.out
            .flush()
            .map_err(|e| DomainSweepError::file_error(shown.clone(), format!("Failed to flush: {}", e)))?;

        tracing::debug!(path = %shown, lines = written, "Wrote available domains");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn failed() -> Verdict {
        Verdict::Failed {
            reason: "timeout".to_string(),
        }
    }

    #[test]
    fn test_writes_only_available_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let candidates: Vec<String> = ["a.zz", "b.zz", "c.zz", "d.zz"].iter().map(|s| s.to_string()).collect();
        let verdicts = vec![Verdict::Available, Verdict::Taken, failed(), Verdict::Available];

        let written = ResultWriter::create(&path)
            .unwrap()
            .write_available(&candidates, &verdicts)
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a.zz\nd.zz\n");
    }

    #[test]
    fn test_nothing_available_gives_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let candidates = vec!["a.zz".to_string(), "b.zz".to_string()];
        let verdicts = vec![Verdict::Taken, failed()];

        let writer = ResultWriter::create(&path).unwrap();
        assert_eq!(writer.write_available(&candidates, &verdicts).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_create_truncates_and_makes_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("com.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale.com\n").unwrap();

        let writer = ResultWriter::create(&path).unwrap();
        // Truncated as soon as it is opened
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        writer
            .write_available(&["q.com".to_string()], &[Verdict::Available])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "q.com\n");

        let fresh = dir.path().join("new-dir").join("com.txt");
        let writer = ResultWriter::create(&fresh).unwrap();
        assert_eq!(writer.path(), fresh.as_path());
        assert!(fresh.exists());
    }

    #[test]
    fn test_unwritable_path_fails_at_create() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("plain-file");
        fs::write(&blocker, "").unwrap();

        let result = ResultWriter::create(blocker.join("sub").join("com.txt"));
        assert!(matches!(result, Err(DomainSweepError::FileError { .. })));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let writer = ResultWriter::create(&path).unwrap();
        let result = writer.write_available(&["a.zz".to_string()], &[]);
        assert!(matches!(result, Err(DomainSweepError::Internal { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
