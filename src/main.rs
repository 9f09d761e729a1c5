//! Rankcrawl main entry point
//!
//! This is the command-line interface for the Rankcrawl ranked-site crawler.

use clap::{Parser, Subcommand};
use rankcrawl::config::{
    compute_file_hash, load_patterns, load_settings_with_hash, validate, CrawlConfig, Settings,
};
use rankcrawl::crawler::{
    build_http_client, repeatable_signal, run_crawl, Crawler, HttpFetcher, LogProgress,
    ProgressObserver,
};
use rankcrawl::output::{open_append, RunStatus};
use rankcrawl::storage::{open_store, SITES_NAMESPACE};
use rankcrawl::ConfigError;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Progress is logged every this many sites
const PROGRESS_INTERVAL: u64 = 1000;

/// Rankcrawl: fetch ranked sites in parallel and match them against patterns
#[derive(Parser, Debug)]
#[command(name = "rankcrawl")]
#[command(version)]
#[command(about = "A utility for fetching and parsing top-ranked sites in parallel", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cache the list of domains to crawl
    Cache {
        /// Path to the database with cached domains
        #[arg(long, default_value = "sites.db")]
        db: PathBuf,

        /// CSV with the domain list in `rank,domain` format
        #[arg(long, default_value = "top-1m.csv")]
        csv: PathBuf,
    },

    /// Start crawling the cached sites and check them against patterns
    Start(StartArgs),
}

#[derive(clap::Args, Debug)]
struct StartArgs {
    /// Path to an optional TOML settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the database with cached domains
    #[arg(long)]
    db: Option<String>,

    /// JSON map that specifies match patterns
    #[arg(short, long)]
    patterns: Option<String>,

    /// File to append the results to
    #[arg(short, long)]
    out: Option<String>,

    /// How deeply the crawler should go (1-3)
    #[arg(short, long)]
    level: Option<u8>,

    /// Maximum parallel jobs allowed (1-1024)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Skip rank keys that sort below this offset
    #[arg(short, long, default_value_t = 0)]
    skip: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Cache { db, csv } => handle_cache(&db, &csv)?,
        Command::Start(args) => handle_start(args).await?,
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rankcrawl=info,warn"),
            1 => EnvFilter::new("rankcrawl=debug,info"),
            2 => EnvFilter::new("rankcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `cache` command: imports a rank list into the store
fn handle_cache(db: &Path, csv: &Path) -> rankcrawl::Result<()> {
    tracing::info!("Caching {} into {}", csv.display(), db.display());

    let mut store = open_store(db)?;
    let reader = BufReader::new(File::open(csv)?);
    let report = store.import_ranks(SITES_NAMESPACE, reader)?;

    tracing::info!(
        "Cached {} domains ({} malformed lines skipped)",
        report.imported,
        report.skipped
    );
    Ok(())
}

/// Merges the settings file (if any) with command-line overrides
fn resolve_settings(args: &StartArgs) -> Result<Settings, ConfigError> {
    let mut settings = match &args.config {
        Some(path) => {
            let (settings, hash) = load_settings_with_hash(path)?;
            tracing::info!(
                "Settings loaded from {} (hash: {})",
                path.display(),
                hash
            );
            settings
        }
        None => Settings::default(),
    };

    if let Some(db) = &args.db {
        settings.input.database_path = db.clone();
    }
    if let Some(patterns) = &args.patterns {
        settings.input.patterns_path = patterns.clone();
    }
    if let Some(out) = &args.out {
        settings.output.results_path = out.clone();
    }
    if let Some(level) = args.level {
        settings.crawler.level = level;
    }
    if let Some(jobs) = args.jobs {
        settings.crawler.jobs = jobs;
    }

    validate(&settings)?;
    Ok(settings)
}

/// Handles the `start` command: runs the crawl until done or interrupted
async fn handle_start(args: StartArgs) -> rankcrawl::Result<()> {
    let settings = match resolve_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let patterns_path = Path::new(&settings.input.patterns_path);
    let patterns = load_patterns(patterns_path);
    if patterns.is_empty() {
        tracing::warn!("No patterns loaded; every site will be reported as a no-match");
    } else if let Ok(hash) = compute_file_hash(patterns_path) {
        tracing::info!("Loaded {} patterns (hash: {})", patterns.len(), hash);
    }

    let store = open_store(Path::new(&settings.input.database_path))?;
    let out = open_append(Path::new(&settings.output.results_path))?;

    let config = CrawlConfig::from_settings(&settings.crawler, patterns);
    let client = build_http_client(&settings.user_agent, config.timeout)?;
    let crawler = Crawler::new(store, config, Arc::new(HttpFetcher::new(client)));

    let total = match crawler.pending(args.skip) {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("unable to start crawling: {}", e);
            return Err(e);
        }
    };
    let progress = Arc::new(LogProgress::new(total, PROGRESS_INTERVAL));
    let crawler = crawler.with_observer(Arc::clone(&progress) as Arc<dyn ProgressObserver>);

    tracing::info!(
        "crawl started on {} sites, jobs: {}, deepness: {}",
        total,
        settings.crawler.jobs,
        settings.crawler.level
    );

    // A second Ctrl-C skips the drain and exits at once
    let shutdown = repeatable_signal(
        || async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for interrupt: {}", e);
                std::future::pending::<()>().await;
            }
        },
        || {
            tracing::warn!("Second interrupt received, exiting without draining");
            std::process::exit(0);
        },
    );

    match run_crawl(&crawler, args.skip, out, shutdown).await {
        Ok(summary) => {
            tracing::debug!("{} of {} sites dequeued", progress.seen(), total);
            if summary.status == RunStatus::Completed {
                tracing::info!("All sites have been crawled.");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("unable to start crawling: {}", e);
            Err(e)
        }
    }
}
