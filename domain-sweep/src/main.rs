//! Domain Sweep CLI Application
//!
//! Enumerates every lowercase domain of a given length under one suffix,
//! checks each over WHOIS and writes the available ones to a file.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use domain_sweep_lib::{
    candidate_count, expand_home, generate_candidates, load_env_config, normalize_suffix, parse_length,
    parse_timeout, sweep, AvailabilityChecker, ConfigManager, FileConfig, SweepConfig, DEFAULT_CONCURRENCY,
    DEFAULT_TIMEOUT, MAX_CONCURRENCY,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Sweeps above this many candidates ask for confirmation on a terminal.
const CONFIRM_THRESHOLD: usize = 5000;

/// CLI arguments for domain-sweep
#[derive(Parser, Debug)]
#[command(name = "domain-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find unregistered domains of a fixed length")]
#[command(
    long_about = "Generate every lowercase domain of a fixed length under one suffix, check each one over WHOIS, and write the available ones to a file.\n\nLength and suffix are prompted for when not given."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Number of letters before the suffix (prompted if omitted)
    #[arg(short = 'l', long = "length", value_name = "N", help_heading = "Sweep")]
    pub length: Option<String>,

    /// Domain suffix, e.g. .com or io (prompted if omitted, blank means .com)
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX", help_heading = "Sweep")]
    pub suffix: Option<String>,

    /// File for available domains [default: ~/Desktop/com.txt]
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "Sweep")]
    pub output: Option<String>,

    /// Print the candidates without checking them
    #[arg(long = "dry-run", help_heading = "Sweep")]
    pub dry_run: bool,

    /// Skip the confirmation prompt for large sweeps
    #[arg(short = 'y', long = "yes", help_heading = "Sweep")]
    pub yes: bool,

    /// Max concurrent WHOIS lookups (1-100) [default: 10]
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Lookups")]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout, e.g. 10s or 1m [default: 10s]
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Lookups")]
    pub timeout: Option<String>,

    /// Use a specific config file instead of discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Print the summary as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Show configuration sources and sweep progress logs
    #[arg(short = 'v', long = "verbose", help_heading = "Output")]
    pub verbose: bool,

    /// Show per-lookup debug logs
    #[arg(short = 'd', long = "debug", help_heading = "Output")]
    pub debug: bool,
}

/// Settings resolved from files, environment and flags.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    concurrency: usize,
    timeout: Duration,
    /// `None` means the suffix has to be prompted for
    suffix: Option<String>,
    output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            suffix: None,
            output: domain_sweep_lib::default_output_path(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_sweep(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` and `--verbose` pick the level.
fn init_logging(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(format!("Concurrency must be between 1 and {}", MAX_CONCURRENCY));
        }
    }

    if let Some(output) = &args.output {
        if output.trim().is_empty() {
            return Err("Output path cannot be empty".to_string());
        }
    }

    Ok(())
}

/// Main sweep logic
async fn run_sweep(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;

    let length = match &args.length {
        Some(raw) => parse_length(raw)?,
        None => parse_length(&prompt("Enter domain length: ")?)?,
    };

    let suffix = match &settings.suffix {
        Some(raw) => normalize_suffix(raw)?,
        None => normalize_suffix(&prompt("Enter domain suffix (default .com): ")?)?,
    };

    // Overflow check before anything is allocated
    let total = candidate_count(length)?;

    if args.dry_run {
        let candidates = generate_candidates(length, &suffix)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        } else {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for candidate in &candidates {
                writeln!(out, "{}", candidate)?;
            }
        }
        eprintln!("{} domains would be checked", candidates.len());
        return Ok(());
    }

    if total > CONFIRM_THRESHOLD && !args.yes && !confirm_large_sweep(total, settings.concurrency)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    if !args.json {
        ui::print_header(length, &suffix, total, settings.concurrency, &settings.output);
    }

    let config = SweepConfig::new(length, suffix)
        .with_output(settings.output)
        .with_concurrency(settings.concurrency)
        .with_timeout(settings.timeout);

    let progress = ui::ProgressLine::new();
    let outcome = sweep(&config, AvailabilityChecker::new(), &|done: usize, of: usize| {
        progress.update(done, of)
    })
    .await;
    progress.finish();
    let summary = outcome?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        ui::print_completion(summary.available, &summary.output);
        ui::print_summary(&summary);
        ui::print_failure_summary(&summary.failures);
    }

    Ok(())
}

/// Print `message` to stderr and read one line from stdin.
///
/// Stdout is reserved for candidates and JSON.
fn prompt(message: &str) -> Result<String, Box<dyn std::error::Error>> {
    eprint!("{}", message);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask before a large sweep. Non-interactive runs proceed.
fn confirm_large_sweep(total: usize, concurrency: usize) -> Result<bool, Box<dyn std::error::Error>> {
    let term = Term::stderr();
    if !term.is_term() {
        return Ok(true);
    }

    let estimated_secs = total as f64 / concurrency as f64;
    eprint!(
        "Will check {} domains (~{:.0}s at concurrency {}). Proceed? [Y/n] ",
        total, estimated_secs, concurrency
    );

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(!(answer == "n" || answer == "no"))
}

/// Build settings with proper precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (DS_*)
/// 3. Local config file (./domain-sweep.toml)
/// 4. Global config file (~/.domain-sweep.toml)
/// 5. XDG config file (~/.config/domain-sweep/config.toml)
/// 6. Built-in defaults
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::default();
    let config_manager = ConfigManager::new(args.verbose);

    // Step 1: Config files
    if let Some(explicit_config_path) = &args.config {
        tracing::info!(path = %explicit_config_path, "Using explicit config file");
        let file_config = config_manager
            .load_file(expand_home(explicit_config_path))
            .map_err(|e| format!("Failed to load config file '{}': {}", explicit_config_path, e))?;
        settings = apply_file_config(settings, file_config)?;
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => settings = apply_file_config(settings, file_config)?,
            Err(e) => tracing::warn!(error = %e, "Config discovery failed"),
        }
    }

    // Step 2: Environment variables (DS_*)
    let env_config = load_env_config(args.verbose);
    if let Some(concurrency) = env_config.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(timeout) = &env_config.timeout {
        settings.timeout = parse_timeout(timeout)?;
    }
    if let Some(suffix) = env_config.suffix {
        settings.suffix = Some(suffix);
    }
    if let Some(output) = &env_config.output {
        settings.output = expand_home(output);
    }

    // Step 3: CLI arguments (highest precedence)
    apply_cli_args(settings, args)
}

/// Apply the `[defaults]` section of a config file.
fn apply_file_config(mut settings: Settings, file_config: FileConfig) -> Result<Settings, Box<dyn std::error::Error>> {
    if let Some(defaults) = file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout) = &defaults.timeout {
            settings.timeout = parse_timeout(timeout)?;
        }
        if let Some(suffix) = defaults.suffix {
            settings.suffix = Some(suffix);
        }
        if let Some(output) = &defaults.output {
            settings.output = expand_home(output);
        }
    }
    Ok(settings)
}

/// Apply CLI arguments (highest precedence).
fn apply_cli_args(mut settings: Settings, args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(timeout) = &args.timeout {
        settings.timeout = parse_timeout(timeout)?;
    }
    if let Some(suffix) = &args.suffix {
        settings.suffix = Some(suffix.clone());
    }
    if let Some(output) = &args.output {
        settings.output = expand_home(output);
    }
    Ok(settings)
}
