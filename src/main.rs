//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the polite catalog crawler.

use anyhow::Context;
use catalog_crawler::config::{
    load_file_config_with_hash, validate, CrawlConfig, FileConfig, DEFAULT_DELAY_MS,
    DEFAULT_MAX_PAGES, DEFAULT_START_URL, DEFAULT_USER_AGENT,
};
use catalog_crawler::crawler::crawl;
use catalog_crawler::output::print_summary;
use catalog_crawler::BooksExtractor;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Catalog-Crawler: a polite paginated catalog crawler
///
/// Walks listing pages one at a time, honoring robots.txt and politeness
/// delays, and appends deduplicated product records to a JSON Lines file.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "A polite paginated catalog crawler", long_about = None)]
struct Cli {
    /// First listing page to fetch
    #[arg(long, value_name = "URL", default_value = DEFAULT_START_URL)]
    start: String,

    /// Maximum number of listing pages to visit
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Minimum delay before each request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// User-Agent header, also used for robots.txt rules
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Crawl and extract but do not write any records
    #[arg(long)]
    dry_run: bool,

    /// JSON Lines file to append records to
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Optional TOML file with [fetcher] and [output] settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match crawl(config, BooksExtractor::new()).await {
        Ok(summary) => {
            if !cli.quiet {
                print_summary(&summary);
            }
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            tracing::error!("Crawl failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "catalog_crawler=info,warn",
            1 => "catalog_crawler=debug,info",
            2 => "catalog_crawler=trace,debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges CLI flags over the optional config file and validates the result
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (file, hash) = load_file_config_with_hash(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            file
        }
        None => FileConfig::default(),
    };

    let start_url = Url::parse(&cli.start).with_context(|| format!("invalid --start URL {}", cli.start))?;

    let mut config = CrawlConfig::new(start_url);
    config.max_pages = cli.max_pages;
    config.delay_ms = cli.delay_ms;
    config.user_agent = cli.user_agent.clone();
    config.dry_run = cli.dry_run;
    config.fetcher = file.fetcher;
    config.output = file.output;
    if let Some(path) = &cli.output {
        config.output.path = path.clone();
    }

    validate(&config)?;
    Ok(config)
}
