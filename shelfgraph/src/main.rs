//! shelfgraph - rating charts for catalog authors and series
//!
//! Example URLs:
//! - Author: `https://www.goodreads.com/author/show/2565.Ian_Fleming`
//! - Series: `https://www.goodreads.com/series/49397-james-bond---extended-series`
//!
//! **Usage:**
//! ```bash
//! shelfgraph --series [--cut-off N] [--sort-by-rating] [--prompt-new-cutoff] URL...
//! shelfgraph --author [--min-num-ratings N] [--prompt-more-urls] URL...
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser};
use shelfgraph::driver::{Driver, DriverOptions};
use shelfgraph::input::StdinLines;
use shelfgraph::models::{Cutoff, EntityKind, SortMode};
use shelfgraph::render::SvgChartRenderer;
use shelfgraph::services::goodreads_client::GOODREADS_BASE_URL;
use shelfgraph::services::{GoodreadsClient, GoodreadsClientConfig, ResponseCache};
use shelfgraph_common::config::{resolve_credential, TomlConfig, ENV_CLIENT_KEY};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

/// Command-line arguments for shelfgraph
#[derive(Parser, Debug)]
#[command(name = "shelfgraph")]
#[command(about = "Graph the average ratings of an author's or a series' books")]
#[command(version)]
#[command(group(ArgGroup::new("kind").required(true).args(["author", "series"])))]
struct Args {
    /// Author mode: URLs are author pages
    #[arg(long)]
    author: bool,

    /// Series mode: URLs are series pages
    #[arg(long)]
    series: bool,

    /// Only graph the first N books (-1 graphs all of them)
    #[arg(long = "cut-off", default_value_t = -1, allow_negative_numbers = true)]
    cut_off: i64,

    /// After each graph, prompt for a new cutoff
    #[arg(long)]
    prompt_new_cutoff: bool,

    /// After the URLs given, prompt for more
    #[arg(long)]
    prompt_more_urls: bool,

    /// Sort by average rating, highest first
    #[arg(long)]
    sort_by_rating: bool,

    /// Author mode: books need more than this many ratings
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    min_num_ratings: i64,

    /// Catalog API key (also SHELFGRAPH_CLIENT_KEY or client_key in the config file)
    #[arg(long)]
    client_key: Option<String>,

    /// Config file (default: ~/.config/shelfgraph/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Always fetch from the network; do not read or write the response cache
    #[arg(long)]
    no_cache: bool,

    /// Directory for chart files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Pages fetched concurrently after the first
    #[arg(long)]
    fetch_concurrency: Option<usize>,

    /// Catalog URLs, all of the selected kind
    #[arg(required = true, num_args = 1..)]
    urls: Vec<String>,
}

fn init_tracing(default_level: &str) {
    // Logs on stderr keep prompts on stdout readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    info!("Starting shelfgraph v{}", env!("CARGO_PKG_VERSION"));

    let api_key = resolve_credential(
        "Client key",
        args.client_key.as_deref(),
        ENV_CLIENT_KEY,
        config.client_key.as_deref(),
    )
    .ok_or_else(|| {
        anyhow!(
            "Client key not configured. Provide one of:\n\
             1. --client-key <KEY>\n\
             2. Environment: {}=<KEY>\n\
             3. Config file: client_key = \"<KEY>\"",
            ENV_CLIENT_KEY
        )
    })?;

    let cache = if args.no_cache {
        info!("Response cache disabled");
        None
    } else {
        let path = config.resolved_cache_path();
        // Out-of-range TTLs behave like no TTL
        let ttl = config
            .cache_ttl_hours
            .and_then(|h| i64::try_from(h).ok())
            .and_then(chrono::Duration::try_hours);
        let cache = ResponseCache::open(&path, ttl)
            .await
            .with_context(|| format!("Failed to open response cache at {}", path.display()))?;
        info!("Response cache: {}", path.display());
        Some(cache)
    };

    let client = GoodreadsClient::new(
        GoodreadsClientConfig {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GOODREADS_BASE_URL.to_string()),
            api_key,
            requests_per_second: config.requests_per_second,
            timeout: Duration::from_secs(30),
        },
        cache,
    )
    .context("Failed to create catalog client")?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.resolved_output_dir());
    info!("Charts: {}", output_dir.display());
    let mut renderer = SvgChartRenderer::new(output_dir);
    let mut input = StdinLines;

    let kind = if args.author {
        EntityKind::Author
    } else {
        EntityKind::Collection
    };

    let options = DriverOptions {
        cutoff: Cutoff(args.cut_off),
        sort_mode: if args.sort_by_rating {
            SortMode::RatingDescending
        } else {
            SortMode::PopularityOrder
        },
        min_ratings_count: args.min_num_ratings,
        interactive_cutoff: args.prompt_new_cutoff,
        interactive_more_urls: args.prompt_more_urls,
        fetch_concurrency: args.fetch_concurrency.unwrap_or(config.fetch_concurrency),
        ..DriverOptions::new(kind)
    };

    let summary = Driver::new(&client, &mut renderer, &mut input, options)
        .run(&args.urls)
        .await;

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Session complete"
    );

    if summary.succeeded == 0 && summary.failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
