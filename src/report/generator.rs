//! Markdown and JSON report generation.
//!
//! This module renders a [`RunReport`] for people (Markdown) or tools (JSON)
//! and writes the artifact list next to it.

use crate::config::ReportFormat;
use crate::models::{
    ClubDistribution, ClubSummary, PlayerRecord, RegressionFit, RunMetadata, RunReport,
    SkippedClub,
};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# Roster Value Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_clubs_section(&report.clubs));
    output.push_str(&generate_skipped_section(&report.skipped));
    output.push_str(&generate_top_players_section(&report.top_players));
    output.push_str(&generate_totals_section(&report.clubs));
    output.push_str(&generate_regression_section(
        &report.regression,
        report.top_players.first(),
    ));
    output.push_str(&generate_distribution_section(&report.distributions));
    output.push_str(&generate_artifacts_section(&report.artifacts));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Run Date:** {}\n",
        metadata.run_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Clubs Requested:** {}\n",
        metadata.clubs_requested
    ));
    section.push_str(&format!(
        "- **Clubs Processed:** {}\n",
        metadata.clubs_processed
    ));
    if metadata.clubs_skipped > 0 {
        section.push_str(&format!("- **Clubs Skipped:** {}\n", metadata.clubs_skipped));
    }
    section.push_str(&format!("- **Total Players:** {}\n", metadata.total_players));
    section.push_str(&format!(
        "- **Run Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &RunReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Clubs](#clubs)\n");
    if !report.skipped.is_empty() {
        toc.push_str("- [Skipped Clubs](#skipped-clubs)\n");
    }
    if !report.top_players.is_empty() {
        toc.push_str("- [Most Valuable Players](#most-valuable-players)\n");
    }
    toc.push_str("- [Club Totals](#club-totals)\n");
    toc.push_str("- [Regression](#regression)\n");
    if !report.distributions.is_empty() {
        toc.push_str("- [Value Distributions](#value-distributions)\n");
    }
    toc.push_str("- [Files](#files)\n");
    toc.push('\n');

    toc
}

/// Generate the per-club statistics table.
fn generate_clubs_section(clubs: &[ClubSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Clubs\n\n");
    section.push_str("| Club | Players | Valued | Skipped Rows | Mean (€m) | Std Dev (€m) |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for club in clubs {
        let (mean, stddev) = match club.stats {
            Some(stats) => (format!("{:.2}", stats.mean), optional(stats.stddev)),
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            club.club_name, club.players, club.valued, club.skipped_rows, mean, stddev
        ));
    }
    section.push('\n');

    let notes: Vec<_> = clubs
        .iter()
        .filter_map(|c| c.stats_error.as_ref().map(|e| (c, e)))
        .collect();
    if !notes.is_empty() {
        for (club, error) in notes {
            section.push_str(&format!("> ⚠️ **{}:** {}\n", club.club_name, error));
        }
        section.push('\n');
    }

    section
}

/// Generate the skipped clubs section.
fn generate_skipped_section(skipped: &[SkippedClub]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Skipped Clubs\n\n");
    section.push_str("| URL | Stage | Reason |\n");
    section.push_str("|:---|:---:|:---|\n");
    for club in skipped {
        section.push_str(&format!(
            "| `{}` | {} | {} |\n",
            club.url, club.stage, club.reason
        ));
    }
    section.push('\n');

    section
}

/// Generate the most valuable players section.
fn generate_top_players_section(players: &[PlayerRecord]) -> String {
    if players.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Most Valuable Players\n\n");
    section.push_str("| # | Player | Club | Value |\n");
    section.push_str("|:---:|:---|:---|---:|\n");
    for (i, player) in players.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            player.name,
            player.club,
            player.value_label()
        ));
    }
    section.push('\n');

    section
}

/// Generate the club totals section, largest first.
fn generate_totals_section(clubs: &[ClubSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Club Totals\n\n");
    section.push_str("| Club | Total (€m) |\n");
    section.push_str("|:---|---:|\n");

    let mut totals: Vec<_> = clubs.iter().collect();
    totals.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    for club in totals {
        section.push_str(&format!(
            "| {} | {:.2} |\n",
            club.club_name, club.total_value
        ));
    }
    section.push('\n');

    section
}

/// Generate the regression section.
fn generate_regression_section(fit: &RegressionFit, top: Option<&PlayerRecord>) -> String {
    let mut section = String::new();

    section.push_str("## Regression\n\n");
    section.push_str(&format!(
        "`position = {:.4} + {:.4} × value` over {} valued players (r² = {:.4})\n\n",
        fit.intercept, fit.slope, fit.observations, fit.r_squared
    ));
    if let Some(value) = top.and_then(|p| p.value) {
        section.push_str(&format!(
            "At the top value of €{:.2}m the line gives position {:.1}.\n\n",
            value,
            fit.predict(value)
        ));
    }
    section.push_str(
        "> ℹ️ The dependent variable is each player's position in the combined table, \
         so this line only gives a coarse picture of how values are spread.\n\n",
    );

    section
}

/// Generate the normal-fit parameters per club.
fn generate_distribution_section(distributions: &[ClubDistribution]) -> String {
    if distributions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Value Distributions\n\n");
    section.push_str("| Club | Range (€m) | Bins | Peak Density | Curve Points |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for dist in distributions {
        let range = match (dist.bins.first(), dist.bins.last()) {
            (Some(first), Some(last)) => format!("{:.2} to {:.2}", first.lower, last.upper),
            _ => "n/a".to_string(),
        };
        let peak = dist.bins.iter().map(|b| b.density).fold(0.0, f64::max);
        section.push_str(&format!(
            "| {} | {} | {} | {:.3} | {} |\n",
            dist.club_name,
            range,
            dist.bins.len(),
            peak,
            dist.curve.len()
        ));
    }
    section.push('\n');

    section
}

/// Generate the list of produced files.
fn generate_artifacts_section(artifacts: &[String]) -> String {
    let mut section = String::new();

    section.push_str("## Files\n\n");
    for artifact in artifacts {
        section.push_str(&format!("- `{}`\n", artifact));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by rostervalue v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render the report in `format` and write it into `dir`.
pub fn write_report(report: &RunReport, format: ReportFormat, dir: &Path) -> Result<PathBuf> {
    let content = match format {
        ReportFormat::Markdown => generate_markdown_report(report),
        ReportFormat::Json => generate_json_report(report)?,
    };

    let path = dir.join(format.file_name());
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}

/// Write one artifact name per line to `dir/<name>`.
pub fn write_files_list(artifacts: &[String], dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut content = artifacts.join("\n");
    content.push('\n');

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistogramBin, Stage, ValueStats};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_report() -> RunReport {
        let metadata = RunMetadata {
            run_date: Utc::now(),
            clubs_requested: 3,
            clubs_processed: 2,
            clubs_skipped: 1,
            total_players: 3,
            duration_seconds: 4.2,
        };

        RunReport {
            metadata,
            clubs: vec![
                ClubSummary {
                    club_id: "club-x".to_string(),
                    club_name: "club x".to_string(),
                    players: 2,
                    valued: 2,
                    skipped_rows: 0,
                    total_value: 2.5,
                    stats: Some(ValueStats {
                        count: 2,
                        mean: 1.25,
                        stddev: Some(1.0607),
                    }),
                    stats_error: None,
                },
                ClubSummary {
                    club_id: "club-y".to_string(),
                    club_name: "club y".to_string(),
                    players: 1,
                    valued: 0,
                    skipped_rows: 1,
                    total_value: 0.0,
                    stats: None,
                    stats_error: Some("insufficient data for club 'club y'".to_string()),
                },
            ],
            skipped: vec![SkippedClub {
                url: "https://www.transfermarkt.com/club-z/startseite/verein/3".to_string(),
                club_id: Some("club-z".to_string()),
                stage: Stage::Fetching,
                reason: "HTTP 404".to_string(),
            }],
            regression: RegressionFit {
                slope: -0.5,
                intercept: 1.0,
                r_squared: 1.0,
                observations: 2,
            },
            top_players: vec![PlayerRecord {
                name: "Alice".to_string(),
                club: "club x".to_string(),
                value: Some(2.0),
            }],
            distributions: vec![ClubDistribution {
                club_name: "club x".to_string(),
                bins: vec![
                    HistogramBin {
                        lower: 0.5,
                        upper: 1.25,
                        count: 1,
                        density: 0.6667,
                    },
                    HistogramBin {
                        lower: 1.25,
                        upper: 2.0,
                        count: 1,
                        density: 0.6667,
                    },
                ],
                curve: vec![(0.5, 0.29), (2.0, 0.29)],
            }],
            artifacts: vec![
                "csv_files/club-x_values.csv".to_string(),
                "csv_files/club-y_values.csv".to_string(),
                "csv_files/merged_values.csv".to_string(),
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Roster Value Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Clubs"));
        assert!(markdown.contains("| club x | 2 | 2 | 0 | 1.25 | 1.06 |"));
        assert!(markdown.contains("| club y | 1 | 0 | 1 | n/a | n/a |"));
        assert!(markdown.contains("## Skipped Clubs"));
        assert!(markdown.contains("HTTP 404"));
        assert!(markdown.contains("| 1 | Alice | club x | €2.00m |"));
        assert!(markdown.contains("coarse picture"));
        assert!(markdown.contains("€2.00m the line gives position 0.0"));
        assert!(markdown.contains("`csv_files/merged_values.csv`"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let mut metadata = create_test_report().metadata;
        let section = generate_metadata_section(&metadata);

        assert!(section.contains("Clubs Requested:** 3"));
        assert!(section.contains("Clubs Skipped:** 1"));
        assert!(section.contains("4.2s"));

        metadata.clubs_skipped = 0;
        assert!(!generate_metadata_section(&metadata).contains("Clubs Skipped"));
    }

    #[test]
    fn test_totals_sorted_descending() {
        let mut clubs = create_test_report().clubs;
        clubs.reverse();
        let section = generate_totals_section(&clubs);

        let x = section.find("| club x | 2.50 |").unwrap();
        let y = section.find("| club y | 0.00 |").unwrap();
        assert!(x < y);
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut report = create_test_report();
        report.skipped.clear();
        report.top_players.clear();
        report.distributions.clear();

        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("Skipped Clubs"));
        assert!(!markdown.contains("Most Valuable Players"));
        assert!(!markdown.contains("Value Distributions"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"clubs\""));
        assert!(json.contains("\"stage\": \"fetching\""));
        assert!(json.contains("\"r_squared\""));
    }

    #[test]
    fn test_write_report_and_files_list() {
        let dir = TempDir::new().unwrap();
        let report = create_test_report();

        let md = write_report(&report, ReportFormat::Markdown, dir.path()).unwrap();
        assert_eq!(md, dir.path().join("report.md"));
        let json = write_report(&report, ReportFormat::Json, dir.path()).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed["metadata"]["clubs_processed"], 2);

        let list = write_files_list(&report.artifacts, dir.path(), "files_list.txt").unwrap();
        assert_eq!(
            std::fs::read_to_string(list).unwrap(),
            "csv_files/club-x_values.csv\ncsv_files/club-y_values.csv\ncsv_files/merged_values.csv\n"
        );
    }
}
