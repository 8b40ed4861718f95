//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.rostervalue.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".rostervalue.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Fetcher settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Roster parser settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory all run artifacts are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Run report format.
    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
            report_format: ReportFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Format of the run report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl ReportFormat {
    /// File name of the report for this format.
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "report.md",
            ReportFormat::Json => "report.json",
        }
    }
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum number of roster pages fetched at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timeout() -> f64 {
    30.0
}

// Roster sites reject obvious bot agents.
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/58.0.3029.110 Safari/537.3"
        .to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Roster table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// CSS selector matching one roster row per player.
    #[serde(default = "default_row_selector")]
    pub row_selector: String,

    /// Position of the player name among a row's `th`/`td` cells.
    #[serde(default = "default_name_cell")]
    pub name_cell: usize,

    /// Position of the market value among a row's `th`/`td` cells.
    #[serde(default = "default_value_cell")]
    pub value_cell: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            row_selector: default_row_selector(),
            name_cell: default_name_cell(),
            value_cell: default_value_cell(),
        }
    }
}

fn default_row_selector() -> String {
    "table.items > tbody > tr".to_string()
}

fn default_name_cell() -> usize {
    3
}

fn default_value_cell() -> usize {
    7
}

/// Analysis and report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of histogram bins per club distribution.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Number of samples of the fitted normal curve.
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,

    /// Number of most valuable players listed in the report.
    #[serde(default = "default_top_players")]
    pub top_players: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
            curve_points: default_curve_points(),
            top_players: default_top_players(),
        }
    }
}

fn default_histogram_bins() -> usize {
    10
}

fn default_curve_points() -> usize {
    100
}

fn default_top_players() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }
        if let Some(format) = args.format {
            self.general.report_format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = timeout;
        }
        if let Some(concurrency) = args.concurrency {
            self.fetch.concurrency = concurrency;
        }
        if let Some(ref agent) = args.user_agent {
            self.fetch.user_agent = agent.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
