//! Data models shared across the pipeline.
//!
//! This module contains the player record, the numeric summaries produced by
//! the analyzer and the run report handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One player row after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name as listed on the roster page.
    pub name: String,
    /// Human-readable club name (club identifier with hyphens replaced).
    pub club: String,
    /// Market value in millions of euros, `None` when it could not be normalized.
    pub value: Option<f64>,
}

impl PlayerRecord {
    /// Returns the value formatted for display.
    pub fn value_label(&self) -> String {
        match self.value {
            Some(v) => format!("€{:.2}m", v),
            None => "n/a".to_string(),
        }
    }
}

/// Descriptive statistics over the known values of one club.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    /// Number of players with a known value.
    pub count: usize,
    /// Arithmetic mean in millions.
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` with a single value.
    pub stddev: Option<f64>,
}

/// Ordinary-least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Number of (x, y) pairs the line was fitted on.
    pub observations: usize,
}

impl RegressionFit {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// One bar of a density-normalized histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// `count / (total * width)`, so the bars integrate to one.
    pub density: f64,
}

/// Data needed to draw one club's value distribution with its normal fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubDistribution {
    pub club_name: String,
    pub bins: Vec<HistogramBin>,
    /// `(x, pdf(x))` samples of the fitted normal curve.
    pub curve: Vec<(f64, f64)>,
}

/// Per-club line of the analysis summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubSummary {
    pub club_id: String,
    pub club_name: String,
    /// Rows kept in the dataset.
    pub players: usize,
    /// Rows with a known value.
    pub valued: usize,
    /// Roster rows dropped by the parser.
    pub skipped_rows: usize,
    /// Sum of known values in millions.
    pub total_value: f64,
    /// Statistics, when at least one value is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ValueStats>,
    /// Why `stats` is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_error: Option<String>,
}

/// Pipeline stage a club dropped out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetching,
    Parsing,
    Cleaning,
    Persisting,
    Aggregating,
    Analyzing,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetching => write!(f, "fetching"),
            Stage::Parsing => write!(f, "parsing"),
            Stage::Cleaning => write!(f, "cleaning"),
            Stage::Persisting => write!(f, "persisting"),
            Stage::Aggregating => write!(f, "aggregating"),
            Stage::Analyzing => write!(f, "analyzing"),
            Stage::Reporting => write!(f, "reporting"),
        }
    }
}

/// A club that did not make it into the combined dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedClub {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    pub stage: Stage,
    pub reason: String,
}

/// Metadata about one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_date: DateTime<Utc>,
    pub clubs_requested: usize,
    pub clubs_processed: usize,
    pub clubs_skipped: usize,
    pub total_players: usize,
    pub duration_seconds: f64,
}

/// The complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub clubs: Vec<ClubSummary>,
    pub skipped: Vec<SkippedClub>,
    pub regression: RegressionFit,
    pub top_players: Vec<PlayerRecord>,
    pub distributions: Vec<ClubDistribution>,
    /// File names written during the run, relative to the output directory.
    pub artifacts: Vec<String>,
}
