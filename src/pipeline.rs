//! Run orchestration.
//!
//! Clubs are fetched concurrently and consumed in input order; each page is
//! then parsed, cleaned and persisted before the next one. Once every club has
//! been handled the datasets are merged and analyzed.

use crate::analysis::{
    club_totals, distribution, merge, most_valuable, regress, summarize, CombinedDataset,
};
use crate::config::Config;
use crate::context::RunContext;
use crate::dataset::ClubDataset;
use crate::error::{FetchError, ParseError, PersistError, PipelineError};
use crate::fetch::{ClubSource, Fetcher};
use crate::models::{
    ClubDistribution, ClubSummary, PlayerRecord, RegressionFit, SkippedClub, Stage,
};
use crate::roster::RosterParser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Everything a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub datasets: Vec<ClubDataset>,
    pub combined: CombinedDataset,
    pub clubs: Vec<ClubSummary>,
    pub skipped: Vec<SkippedClub>,
    pub regression: RegressionFit,
    pub distributions: Vec<ClubDistribution>,
    pub top_players: Vec<PlayerRecord>,
    /// Files written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Drives one run over a list of club URLs.
pub struct Pipeline<F: Fetcher> {
    fetcher: F,
    parser: RosterParser,
    ctx: RunContext,
    config: Config,
    show_progress: bool,
}

impl<F: Fetcher> Pipeline<F> {
    /// Build a pipeline. Fails only on an invalid row selector.
    pub fn new(fetcher: F, config: Config) -> Result<Self, PipelineError> {
        let parser = RosterParser::new(&config.parser)?;
        let ctx = RunContext::new(&config.general.output_dir);

        Ok(Self {
            fetcher,
            parser,
            ctx,
            config,
            show_progress: false,
        })
    }

    /// Show a progress bar over club fetches.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Process every URL, then merge and analyze the clubs that made it.
    pub async fn run(&self, urls: &[String]) -> Result<RunOutcome, PipelineError> {
        self.ctx.ensure_dirs().map_err(|source| PersistError::Io {
            path: self.ctx.csv_dir(),
            source,
        })?;

        let mut skipped = Vec::new();
        let mut sources = Vec::new();
        for url in urls {
            match ClubSource::resolve(url) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    skipped.push(SkippedClub {
                        url: url.clone(),
                        club_id: None,
                        stage: Stage::Fetching,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Stage {}: {} clubs", Stage::Fetching, sources.len());
        let pages = self.fetch_all(&sources).await;

        let mut datasets = Vec::new();
        let mut skipped_rows = Vec::new();
        let mut artifacts = Vec::new();

        for (source, page) in sources.iter().zip(pages) {
            let markup = match page {
                Ok(markup) => markup,
                Err(e) => {
                    warn!("Skipping club '{}': {}", source.club_id, e);
                    skipped.push(skip(source, Stage::Fetching, e.to_string()));
                    continue;
                }
            };

            debug!("Stage {}: {}", Stage::Parsing, source.club_id);
            let parsed = self.parser.parse(&markup);
            if parsed.is_empty() {
                let e = ParseError::EmptyRoster {
                    selector: self.parser.row_selector().to_string(),
                };
                warn!("Skipping club '{}': {}", source.club_id, e);
                skipped.push(skip(source, Stage::Parsing, e.to_string()));
                continue;
            }

            debug!("Stage {}: {}", Stage::Cleaning, source.club_id);
            let dataset = ClubDataset::build(&source.club_id, &parsed.rows);

            debug!("Stage {}: {}", Stage::Persisting, source.club_id);
            let path = dataset.save(&self.ctx)?;
            info!(
                "Saved {} players for '{}' to {}",
                dataset.len(),
                dataset.club_name(),
                path.display()
            );

            artifacts.push(path);
            skipped_rows.push(parsed.skipped_rows);
            datasets.push(dataset);
        }

        info!("Stage {}: {} clubs", Stage::Aggregating, datasets.len());
        let combined = merge(&datasets).map_err(PipelineError::Aggregation)?;
        artifacts.push(combined.save(&self.ctx)?);

        info!(
            "Stage {}: {} players from {}",
            Stage::Analyzing,
            combined.len(),
            combined.clubs().join(", ")
        );
        let totals = club_totals(&datasets);
        let clubs = datasets
            .iter()
            .zip(&skipped_rows)
            .zip(&totals)
            .map(|((dataset, &rows), (_, total))| summarize_club(dataset, rows, *total))
            .collect();

        let regression = regress(&combined).map_err(PipelineError::Analysis)?;
        debug!(
            "Regression slope {:.4}, intercept {:.4}, r² {:.4}",
            regression.slope, regression.intercept, regression.r_squared
        );

        let analysis = &self.config.analysis;
        let distributions = datasets
            .iter()
            .filter_map(|d| distribution(d, analysis.histogram_bins, analysis.curve_points))
            .collect();
        let top_players = most_valuable(combined.players(), analysis.top_players);

        Ok(RunOutcome {
            datasets,
            combined,
            clubs,
            skipped,
            regression,
            distributions,
            top_players,
            artifacts,
        })
    }

    /// Fetch every source with bounded concurrency. Results come back in input order.
    async fn fetch_all(&self, sources: &[ClubSource]) -> Vec<Result<String, FetchError>> {
        let progress = self.progress_bar(sources.len());
        let concurrency = self.config.fetch.concurrency.max(1);

        let pages: Vec<_> = stream::iter(sources)
            .map(|source| {
                let progress = progress.as_ref();
                async move {
                    let result = self.fetcher.fetch(&source.url).await;
                    if let Some(pb) = progress {
                        pb.set_message(source.club_id.clone());
                        pb.inc(1);
                    }
                    result
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        pages
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress || len == 0 {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

fn skip(source: &ClubSource, stage: Stage, reason: String) -> SkippedClub {
    SkippedClub {
        url: source.url.clone(),
        club_id: Some(source.club_id.clone()),
        stage,
        reason,
    }
}

fn summarize_club(dataset: &ClubDataset, skipped_rows: usize, total_value: f64) -> ClubSummary {
    let (stats, stats_error) = match summarize(dataset) {
        Ok(stats) => (Some(stats), None),
        Err(e) => {
            warn!("{}", e);
            (None, Some(e.to_string()))
        }
    };

    ClubSummary {
        club_id: dataset.club_id().to_string(),
        club_name: dataset.club_name().to_string(),
        players: dataset.len(),
        valued: stats.map_or(0, |s| s.count),
        skipped_rows,
        total_value,
        stats,
        stats_error,
    }
}
