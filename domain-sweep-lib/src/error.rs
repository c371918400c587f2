//! Error handling for domain sweep operations.
//!
//! This module defines the error type shared by every stage of a sweep,
//! from bad user input through WHOIS failures to file output problems.

use std::time::Duration;
use thiserror::Error;

/// Main error type for domain sweep operations.
///
/// Lookup-level variants (`Network`, `Whois`, `Parse`, `Timeout`,
/// `RateLimited`) never escape a sweep: the checker turns them into a
/// failed verdict. The remaining variants abort the run.
#[derive(Debug, Clone, Error)]
pub enum DomainSweepError {
    /// User input that cannot be used (non-numeric length, etc.)
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// Suffix that is not a simple TLD string
    #[error("Invalid suffix '{suffix}': {reason}")]
    InvalidSuffix { suffix: String, reason: String },

    /// Candidate generation cannot proceed
    #[error("Generation error: {message}")]
    Generation { message: String },

    /// Network-related errors (connect, read, write)
    #[error("Network error: {message}{}", format_cause(.cause))]
    Network {
        message: String,
        cause: Option<String>,
    },

    /// WHOIS protocol specific errors
    #[error("WHOIS error for '{domain}': {message}")]
    Whois { domain: String, message: String },

    /// WHOIS response could not be turned into a record
    #[error("Parse error for '{domain}': {message}")]
    Parse { domain: String, message: String },

    /// Timeout errors when a lookup takes too long
    #[error("Timeout after {duration:?} during: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Registry refused to answer because of query volume
    #[error("Rate limited by {server}: {message}")]
    RateLimited { server: String, message: String },

    /// Configuration errors (invalid settings, etc.)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File I/O errors when reading config or writing results
    #[error("File error at '{path}': {message}")]
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainSweepError {
    /// Create a new invalid input error.
    pub fn invalid_input<I: Into<String>, R: Into<String>>(input: I, reason: R) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid suffix error.
    pub fn invalid_suffix<S: Into<String>, R: Into<String>>(suffix: S, reason: R) -> Self {
        Self::InvalidSuffix {
            suffix: suffix.into(),
            reason: reason.into(),
        }
    }

    /// Create a new generation error.
    pub fn generation<M: Into<String>>(message: M) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            cause: Some(source.into()),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::Whois {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new parse error.
    pub fn parse<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::Parse {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new rate limit error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::RateLimited {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

fn format_cause(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!(" (source: {})", cause),
        None => String::new(),
    }
}
