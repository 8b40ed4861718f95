//! rostervalue - football roster market-value pipeline
//!
//! Downloads club roster pages, extracts player market values, persists one
//! CSV table per club plus a merged table, and reports per-club statistics
//! and a cross-club regression.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, aggregation, analysis, persistence, etc.)
//!   2 - Some clubs were skipped and --strict was given

mod analysis;
mod cli;
mod config;
mod context;
mod dataset;
mod error;
mod fetch;
mod models;
mod pipeline;
mod report;
mod roster;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE};
use context::{table_file_name, RunContext, CSV_DIR, FILES_LIST, MERGED_ID};
use fetch::{ClubSource, HttpFetcher};
use models::{RunMetadata, RunReport, Stage};
use pipeline::{Pipeline, RunOutcome};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("rostervalue v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default config file.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the output directory, fetch and parser settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete pipeline. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let urls = args.collect_urls()?;
    if urls.is_empty() {
        anyhow::bail!("No club URLs given");
    }

    // Handle --dry-run: resolve clubs and exit
    if args.dry_run {
        return handle_dry_run(&urls, &config);
    }

    println!("📥 Fetching {} club roster(s)...", urls.len());
    println!("   Output: {}", config.general.output_dir.display());
    println!("   Concurrency: {}", config.fetch.concurrency);
    println!("   Timeout: {}s", config.fetch.timeout_seconds);

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let format = config.general.report_format;
    let pipeline = Pipeline::new(fetcher, config)?.with_progress(!args.quiet);

    let outcome = pipeline.run(&urls).await.map_err(|e| {
        error!("Run stopped while {}", e.stage());
        e
    })?;

    println!("\n📝 Generating report...");
    info!("Stage {}", Stage::Reporting);

    let ctx = pipeline.context();
    let report = build_report(&outcome, ctx, &urls, format, start_time);
    let report_path = report::write_report(&report, format, ctx.output_dir())?;
    let list_path = report::write_files_list(&report.artifacts, ctx.output_dir(), FILES_LIST)?;
    debug!("Wrote {}", list_path.display());

    print_summary(&outcome, &report);
    println!("\n✅ Run complete! Report saved to: {}", report_path.display());

    if args.strict && !outcome.skipped.is_empty() {
        eprintln!(
            "\n⛔ {} club(s) were skipped. Failing (exit code 2).",
            outcome.skipped.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Assemble the run report from a pipeline outcome.
fn build_report(
    outcome: &RunOutcome,
    ctx: &RunContext,
    urls: &[String],
    format: config::ReportFormat,
    start_time: Instant,
) -> RunReport {
    let mut artifacts: Vec<String> = outcome
        .artifacts
        .iter()
        .map(|path| ctx.relative(path))
        .collect();
    artifacts.push(format.file_name().to_string());
    artifacts.push(FILES_LIST.to_string());

    let metadata = RunMetadata {
        run_date: Utc::now(),
        clubs_requested: urls.len(),
        clubs_processed: outcome.datasets.len(),
        clubs_skipped: outcome.skipped.len(),
        total_players: outcome.combined.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    RunReport {
        metadata,
        clubs: outcome.clubs.clone(),
        skipped: outcome.skipped.clone(),
        regression: outcome.regression,
        top_players: outcome.top_players.clone(),
        distributions: outcome.distributions.clone(),
        artifacts,
    }
}

fn print_summary(outcome: &RunOutcome, report: &RunReport) {
    println!("\n📊 Run Summary:");
    println!(
        "   Clubs processed: {} of {}",
        report.metadata.clubs_processed, report.metadata.clubs_requested
    );
    println!("   Players: {}", outcome.combined.len());
    for club in &outcome.clubs {
        match club.stats {
            Some(stats) => println!(
                "   - {}: mean €{:.2}m, std dev {}",
                club.club_name,
                stats.mean,
                stats
                    .stddev
                    .map_or_else(|| "n/a".to_string(), |sd| format!("€{:.2}m", sd))
            ),
            None => println!("   - {}: no market values", club.club_name),
        }
    }
    for skipped in &outcome.skipped {
        warn!("Skipped {} ({}): {}", skipped.url, skipped.stage, skipped.reason);
        println!("   ⚠️  Skipped {}: {}", skipped.url, skipped.reason);
    }
    println!(
        "   Regression: slope {:.4}, intercept {:.4}, r² {:.4}",
        outcome.regression.slope, outcome.regression.intercept, outcome.regression.r_squared
    );
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}

/// Handle --dry-run: resolve club identifiers and list planned files.
fn handle_dry_run(urls: &[String], config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: resolving clubs (no network)...\n");

    let ctx = RunContext::new(&config.general.output_dir);
    let mut valid = 0;
    for url in urls {
        match ClubSource::resolve(url) {
            Ok(source) => {
                valid += 1;
                println!(
                    "     📄 {} -> {}/{}",
                    source.club_id,
                    CSV_DIR,
                    table_file_name(&source.club_id)
                );
            }
            Err(e) => println!("     ❌ {}", e),
        }
    }

    if valid > 0 {
        println!("\n   Merged table: {}", ctx.table_path(MERGED_ID).display());
        println!(
            "   Report: {}",
            ctx.output_dir()
                .join(config.general.report_format.file_name())
                .display()
        );
    }
    println!("\n   Total: {} of {} clubs resolved", valid, urls.len());

    println!("\n✅ Dry run complete. No requests were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: failed to load {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
