//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::ReportFormat;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// RosterValue - football roster market-value analyzer
///
/// Scrapes club roster pages, normalizes every player's market value to
/// millions of euros, writes one CSV per club plus a merged CSV, and reports
/// per-club statistics and a regression across all clubs.
///
/// Examples:
///   rostervalue https://www.transfermarkt.com/fc-arsenal/startseite/verein/11
///   rostervalue --clubs-file clubs.txt --output-dir runs/2024
///   rostervalue --interactive
///   rostervalue --clubs-file clubs.txt --dry-run
///   rostervalue --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Club roster page URLs, processed in the given order
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one club URL per line ('#' starts a comment)
    #[arg(long, value_name = "FILE")]
    pub clubs_file: Option<PathBuf>,

    /// Prompt for the number of clubs and their URLs on stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Directory for CSV tables and the report
    #[arg(short, long, value_name = "DIR", env = "ROSTERVALUE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rostervalue.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds (fractions allowed)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Maximum number of roster pages fetched concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// User-Agent header for roster requests
    #[arg(long, value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Resolve club identifiers and list the files a run would write, without fetching
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 when any club was skipped
    #[arg(long)]
    pub strict: bool,

    /// Generate a default .rostervalue.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.urls.is_empty() && self.clubs_file.is_none() && !self.interactive {
            return Err(
                "No clubs given: pass URLs, --clubs-file or --interactive".to_string(),
            );
        }

        for url in &self.urls {
            validate_url(url)?;
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if let Some(timeout) = self.timeout {
            if !(timeout > 0.0 && timeout.is_finite()) {
                return Err("Timeout must be a positive number of seconds".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref file) = self.clubs_file {
            if !file.is_file() {
                return Err(format!("Clubs file does not exist: {}", file.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Collect club URLs from all sources, in order: arguments, file, prompt.
    pub fn collect_urls(&self) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();

        if let Some(ref file) = self.clubs_file {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read clubs file: {}", file.display()))?;
            urls.extend(parse_clubs_list(&content));
        }

        if self.interactive {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            urls.extend(prompt_urls(stdin.lock(), stdout.lock())?);
        }

        Ok(urls)
    }
}

/// Check that a URL looks like an http(s) address.
fn validate_url(url: &str) -> Result<(), String> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(format!("Club URL must start with 'http://' or 'https://': {}", url))
    }
}

/// One URL per non-empty line; `#` starts a comment.
pub fn parse_clubs_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Ask for a club count, then that many URLs.
pub fn prompt_urls<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<Vec<String>> {
    write!(output, "Enter the number of clubs you want to input: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let count: usize = line
        .trim()
        .parse()
        .with_context(|| format!("Not a number of clubs: '{}'", line.trim()))?;

    let mut urls = Vec::with_capacity(count);
    for i in 1..=count {
        write!(
            output,
            "Club {} URL (e.g. https://www.transfermarkt.com/fc-arsenal/startseite/verein/11): ",
            i
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("Input ended after {} of {} clubs", i - 1, count);
        }
        let url = line.trim().to_string();
        validate_url(&url).map_err(anyhow::Error::msg)?;
        urls.push(url);
    }

    Ok(urls)
}
