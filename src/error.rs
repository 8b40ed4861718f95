//! Error taxonomy for the pipeline.
//!
//! Per-club failures (fetch, empty roster) are recorded and the run moves on.
//! Aggregation, analysis and persistence failures abort the run and are
//! wrapped in [`PipelineError`] together with the stage that raised them.

use std::path::PathBuf;
use thiserror::Error;

/// Failure retrieving one roster page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("invalid club URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: f64 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Failure extracting a roster from fetched markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No player rows on the page. The club is skipped: no table is written
    /// and it takes no part in the merge.
    #[error("no roster rows found (selector '{selector}')")]
    EmptyRoster { selector: String },

    #[error("invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// A single roster row that could not be turned into a player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row has no {field} at cell {position} ({available} cells)")]
    MissingField {
        field: &'static str,
        position: usize,
        available: usize,
    },
}

/// Failure reading or writing a persisted table.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Failure in the aggregation or statistics stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no club datasets to merge")]
    NoData,

    #[error("insufficient data for {context}: need {needed} numeric values, found {found}")]
    InsufficientData {
        context: String,
        needed: usize,
        found: usize,
    },
}

/// Fatal failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("aggregation failed: {0}")]
    Aggregation(#[source] AnalysisError),

    #[error("analysis failed: {0}")]
    Analysis(#[source] AnalysisError),

    #[error("persisting tables failed: {0}")]
    Persist(#[from] PersistError),

    #[error("parser configuration: {0}")]
    Parser(#[from] ParseError),
}

impl PipelineError {
    /// Name of the stage the run stopped in.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Aggregation(_) => "aggregating",
            PipelineError::Analysis(_) => "analyzing",
            PipelineError::Persist(_) => "persisting",
            PipelineError::Parser(_) => "idle",
        }
    }
}
