//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `DS_*`
//! environment variables, and merging file configurations with proper
//! precedence rules.

use crate::error::DomainSweepError;
use crate::types::MAX_CONCURRENCY;
use crate::utils::{home_dir, normalize_suffix};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 20
/// timeout = "15s"
/// suffix = ".io"
/// output = "~/sweeps/io.txt"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Maximum lookups in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout (as string, e.g., "5s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Suffix used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Output file path; `~` is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// The file must exist and pass validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainSweepError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainSweepError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainSweepError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| DomainSweepError::config(format!("Failed to parse TOML configuration: {}", e)))?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is the lowest precedence, then the global file in the home
    /// directory, then a local file in the working directory. Files that
    /// fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainSweepError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let discovered = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in discovered.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring configuration file");
                }
            }
        }

        if self.verbose {
            for (i, path) in loaded_files.iter().enumerate() {
                let role = if i == loaded_files.len() - 1 {
                    "highest precedence"
                } else {
                    "overridden where set later"
                };
                tracing::info!(path = %path.display(), role, "Loaded configuration file");
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-sweep.toml", "./.domain-sweep.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Get the global configuration file path in the home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = home_dir()?;
        [".domain-sweep.toml", "domain-sweep.toml"]
            .iter()
            .map(|candidate| home.join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|home| home.join(".config")))?;

        let path = config_dir.join("domain-sweep").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.suffix.is_some() {
                        lower_defaults.suffix = higher_defaults.suffix;
                    }
                    if higher_defaults.output.is_some() {
                        lower_defaults.output = higher_defaults.output;
                    }
                    Some(lower_defaults)
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainSweepError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(concurrency) = defaults.concurrency {
            if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                return Err(DomainSweepError::config(format!(
                    "Concurrency must be between 1 and {}",
                    MAX_CONCURRENCY
                )));
            }
        }

        if let Some(timeout_str) = &defaults.timeout {
            if parse_timeout_string(timeout_str).is_none() {
                return Err(DomainSweepError::config(format!(
                    "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                    timeout_str
                )));
            }
        }

        if let Some(suffix) = &defaults.suffix {
            normalize_suffix(suffix)
                .map_err(|e| DomainSweepError::config(format!("Invalid suffix in defaults: {}", e)))?;
        }

        if let Some(output) = &defaults.output {
            if output.trim().is_empty() {
                return Err(DomainSweepError::config("Output path cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// Values come from `DS_CONCURRENCY`, `DS_TIMEOUT`, `DS_SUFFIX` and
/// `DS_OUTPUT`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub suffix: Option<String>,
    pub output: Option<String>,
}

/// Load configuration from environment variables.
///
/// Invalid values are logged as warnings and ignored. With `verbose`, every
/// accepted variable is logged too.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    env_config_from(|name| env::var(name).ok(), verbose)
}

fn env_config_from<F>(var: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = var("DS_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=MAX_CONCURRENCY).contains(&concurrency) => {
                env_config.concurrency = Some(concurrency);
                if verbose {
                    tracing::info!("Using DS_CONCURRENCY={}", concurrency);
                }
            }
            _ => tracing::warn!("Invalid DS_CONCURRENCY='{}', must be 1-{}", val, MAX_CONCURRENCY),
        }
    }

    if let Some(timeout_str) = var("DS_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            if verbose {
                tracing::info!("Using DS_TIMEOUT={}", timeout_str);
            }
            env_config.timeout = Some(timeout_str);
        } else {
            tracing::warn!(
                "Invalid DS_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                timeout_str
            );
        }
    }

    if let Some(suffix) = var("DS_SUFFIX") {
        match normalize_suffix(&suffix) {
            Ok(_) if !suffix.trim().is_empty() => {
                if verbose {
                    tracing::info!("Using DS_SUFFIX={}", suffix);
                }
                env_config.suffix = Some(suffix);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Invalid DS_SUFFIX='{}': {}", suffix, e),
        }
    }

    if let Some(output) = var("DS_OUTPUT") {
        if !output.trim().is_empty() {
            if verbose {
                tracing::info!("Using DS_OUTPUT={}", output);
            }
            env_config.output = Some(output);
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (seconds > 0).then_some(seconds)
}

/// [`parse_timeout_string`] as a `Duration`, with an error for bad input.
pub fn parse_timeout(timeout_str: &str) -> Result<Duration, DomainSweepError> {
    parse_timeout_string(timeout_str)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            DomainSweepError::invalid_input(
                timeout_str,
                "Invalid timeout. Use format like '5s', '30s', '2m'",
            )
        })
}
