//! Shoe-Scout main entry point
//!
//! This is the command-line interface for the Shoe-Scout catalog extractor.

use anyhow::Context;
use clap::Parser;
use shoe_scout::config::{load_config_with_hash, validate, Config, OutputFormat};
use shoe_scout::crawler::{CrawlSettings, HttpFetcher};
use shoe_scout::output::{
    default_output_path, open_sink, print_statistics, spawn_writer, CrawlStatistics,
};
use shoe_scout::rules::{builtin_names, CompiledRules};
use shoe_scout::url::build_search_url;
use shoe_scout::{Coordinator, RunControl, ScoutError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Capacity of the channel between keyword runs and the writer
const WRITER_BUFFER: usize = 1024;

/// Shoe-Scout: retailer catalog extractor
///
/// Searches a retailer for each keyword, visits every product found in the
/// results and writes one row per color, width and size combination.
#[derive(Parser, Debug)]
#[command(name = "shoe-scout")]
#[command(version = "1.0.0")]
#[command(about = "Extracts product variants from retailer search results", long_about = None)]
struct Cli {
    /// Search keywords, one crawl per keyword
    #[arg(value_name = "KEYWORDS", required_unless_present = "list_retailers")]
    keywords: Vec<String>,

    /// Retailer rule set to use
    #[arg(short, long, default_value = "eastbay")]
    retailer: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output file (default: <retailer>_<timestamp>.<ext>)
    #[arg(short = 'o', long, value_name = "FILE")]
    filename: Option<PathBuf>,

    /// Comma-separated proxy URLs, rotated per request
    #[arg(long, value_delimiter = ',')]
    proxies: Vec<String>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Detail pages fetched concurrently per keyword
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved rule set and search URLs without fetching anything
    #[arg(long, conflicts_with = "list_retailers")]
    dry_run: bool,

    /// List available retailer rule sets and exit
    #[arg(long)]
    list_retailers: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid settings")?;

    if cli.list_retailers {
        handle_list_retailers(&config);
        return Ok(());
    }

    let keywords: Vec<String> = cli
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        anyhow::bail!("No keywords given");
    }

    let rule_set = config
        .rule_set(&cli.retailer)?
        .ok_or_else(|| ScoutError::UnknownRetailer(cli.retailer.clone()))?;
    let file_prefix = rule_set.file_prefix();
    let rules = CompiledRules::compile(rule_set)?;

    if cli.dry_run {
        return handle_dry_run(&config, &rules, &keywords);
    }

    let output_path = cli.filename.clone().unwrap_or_else(|| {
        default_output_path(
            &config.output.directory,
            &file_prefix,
            config.output.format,
            chrono::Local::now(),
        )
    });

    handle_crawl(config, rules, keywords, output_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shoe_scout=info,warn"),
            1 => EnvFilter::new("shoe_scout=debug,info"),
            2 => EnvFilter::new("shoe_scout=trace,debug"),
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

/// Command-line flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    let proxies: Vec<String> = cli
        .proxies
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if !proxies.is_empty() {
        config.http.proxies = proxies;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_details = concurrency;
    }
}

/// Handles --list-retailers: built-in presets plus rule sets from the config
fn handle_list_retailers(config: &Config) {
    println!("Built-in retailers:");
    for name in builtin_names() {
        let overridden = config.retailer.iter().any(|r| r.name.eq_ignore_ascii_case(name));
        if overridden {
            println!("  - {} (overridden by config)", name);
        } else {
            println!("  - {}", name);
        }
    }

    if !config.retailer.is_empty() {
        println!("\nFrom config:");
        for rule_set in &config.retailer {
            println!("  - {} ({})", rule_set.name, rule_set.retailer);
        }
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, rules: &CompiledRules, keywords: &[String]) -> anyhow::Result<()> {
    let rule_set = rules.rules();

    println!("=== Shoe-Scout Dry Run ===\n");

    println!("Retailer:");
    println!("  Rule set: {}", rule_set.name);
    println!("  Label: {}", rule_set.retailer);
    println!("  Search URL: {}", rule_set.search_url);
    if !rule_set.keyword_suffix.is_empty() {
        println!("  Keyword suffix: {:?}", rule_set.keyword_suffix);
    }

    println!("\nCrawler Configuration:");
    println!(
        "  Detail workers per keyword: {}",
        config.crawler.max_concurrent_details
    );
    println!("  Parallel keywords: {}", config.crawler.keyword_concurrency);
    println!(
        "  Minimum request interval: {}ms",
        config.crawler.min_request_interval_ms
    );
    match config.crawler.max_listing_pages() {
        Some(max) => println!("  Listing pages per keyword: {}", max),
        None => println!("  Listing pages per keyword: unlimited"),
    }
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Proxies: {}", config.http.proxies.len());

    println!("\nSearch URLs ({}):", keywords.len());
    for keyword in keywords {
        let url = build_search_url(&rule_set.search_url, keyword, &rule_set.keyword_suffix)?;
        println!("  - {:?} -> {}", keyword, url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    rules: CompiledRules,
    keywords: Vec<String>,
    output_path: PathBuf,
) -> anyhow::Result<()> {
    // The only fatal failure: nothing is fetched without a place to write
    let sink = open_sink(config.output.format, &output_path)
        .map_err(ScoutError::from)
        .with_context(|| format!("Cannot create {}", output_path.display()))?;

    let control = RunControl::new();
    {
        let control = control.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing in-flight products");
                control.cancel();
            }
        });
    }

    let fetcher = Arc::new(
        HttpFetcher::new(&config.crawler, &config.http)?.with_control(control.clone()),
    );
    tracing::info!(
        "Crawling {} keyword(s) on {} through {} client(s)",
        keywords.len(),
        rules.retailer(),
        fetcher.client_count()
    );

    let coordinator = Coordinator::new(fetcher, Arc::new(rules), CrawlSettings::from_config(&config));

    let (tx, rx) = mpsc::channel(WRITER_BUFFER);
    let writer = spawn_writer(sink, rx);

    let reports = coordinator
        .run_keywords(
            &keywords,
            config.crawler.keyword_concurrency as usize,
            &tx,
            &control,
        )
        .await;
    drop(tx);

    let rows_written = writer
        .await
        .map_err(ScoutError::from)?
        .map_err(ScoutError::from)
        .context("Writing output failed")?;

    let stats = CrawlStatistics::new(reports, rows_written);
    print_statistics(&stats);
    println!("\nOutput: {}", output_path.display());

    if stats.stopped_early() {
        tracing::warn!("Run stopped early; output holds the records written so far");
    }

    Ok(())
}
