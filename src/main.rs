//! ctrip-sights main entry point
//!
//! This is the command-line interface for the three-level sight crawler.

use anyhow::{bail, Context, Result};
use clap::Parser;
use ctrip_sights::config::{load_or_default, Config};
use ctrip_sights::crawler::{export_run, run_crawl};
use ctrip_sights::logging;
use ctrip_sights::model::PageRange;
use ctrip_sights::output::{print_runs, CsvSink};
use ctrip_sights::storage::{open_storage, RowStore};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// ctrip-sights: crawl cities, sight categories and sights into one CSV
///
/// Walks the city index pages START..=END, every city's sight categories and
/// every category's listing pages, and writes one row per sight to
/// `result__{timestamp}__{START}-{END}.csv`.
#[derive(Parser, Debug)]
#[command(name = "ctrip-sights")]
#[command(version)]
#[command(about = "Three-level sight crawler", long_about = None)]
struct Cli {
    /// First city index page to crawl
    #[arg(value_name = "START", default_value_t = 1)]
    start: u32,

    /// Last city index page to crawl (inclusive)
    #[arg(value_name = "END", default_value_t = 10)]
    end: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_run"])]
    dry_run: bool,

    /// Show the runs recorded in the row spool and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_run"])]
    stats: bool,

    /// Write the spooled rows of a run to a new result file and exit
    #[arg(long, value_name = "RUN_ID", conflicts_with_all = ["dry_run", "stats"])]
    export_run: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    let log_guard = logging::init(Path::new(&config.output.log_path), cli.verbose, cli.quiet)?;
    tracing::debug!("Logging to {}", log_guard.path().display());

    let range = PageRange::new(cli.start, cli.end);
    let result = if cli.dry_run {
        handle_dry_run(&config, range)
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(run_id) = cli.export_run {
        handle_export_run(&config, run_id)
    } else {
        handle_crawl(&config, range).await
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }

    // Flush the log file before the process exits
    drop(log_guard);
    result
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, range: PageRange) -> Result<()> {
    println!("=== ctrip-sights Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  City index path: {}", config.site.city_index_path);

    println!("\nCrawler Configuration:");
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    println!("  City concurrency: {}", config.crawler.city_concurrency);
    println!("  User agent: {}", config.user_agent.user_agent());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Log file: {}", config.output.log_path);
    println!(
        "  Row spool: {}",
        config.output.spool().unwrap_or("(disabled)")
    );

    println!("\nCity index pages ({}):", range);
    for page in range.pages() {
        println!("  - {}", config.site.city_index_url(page));
    }

    println!("\n✓ Configuration is valid");
    if range.is_empty() {
        println!("✗ Page range {} is empty; a crawl would produce no rows", range);
    }

    Ok(())
}

/// Handles the --stats mode: lists the spooled runs
fn handle_stats(config: &Config) -> Result<()> {
    let Some(spool) = config.output.spool() else {
        bail!("The row spool is disabled in the configuration");
    };

    println!("Row spool: {}\n", spool);
    let store = open_storage(Path::new(spool))?;

    let mut runs = Vec::new();
    for run in store.list_runs()? {
        let rows = store.count_rows(run.id)?;
        runs.push((run, rows));
    }
    print_runs(&runs);

    Ok(())
}

/// Handles the --export-run mode: rewrites a spooled run to a result file
fn handle_export_run(config: &Config, run_id: i64) -> Result<()> {
    let Some(spool) = config.output.spool() else {
        bail!("The row spool is disabled in the configuration");
    };

    let mut store = open_storage(Path::new(spool))?;
    let sink = CsvSink::new(&config.output.directory);
    let path = export_run(&mut store, run_id, &sink)
        .with_context(|| format!("Failed to export run {}", run_id))?;

    println!("✓ Run {} exported to: {}", run_id, path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, range: PageRange) -> Result<()> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            interrupt.cancel();
        }
    });

    let path = run_crawl(config, range, cancel)
        .await
        .context("Crawl produced no result file")?;

    println!("✓ Results written to: {}", path.display());
    Ok(())
}
