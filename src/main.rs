//! CLI entry point for the fixturefetch tool.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fixturefetch_core::{FetchEngine, FetcherConfig, consolidate};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // The run log lives next to the cache entries, so make sure the
    // directory exists before the engine opens it.
    std::fs::create_dir_all(&args.cache_dir)
        .with_context(|| format!("cannot create cache directory {}", args.cache_dir.display()))?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(args.cache_dir.join("fixturefetch.log"))
        .context("cannot open run log")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(log_file)),
        )
        .init();

    debug!(?args, "CLI arguments parsed");
    info!("Fixturefetch starting");

    let config = FetcherConfig {
        school_id: args.school_id.clone(),
        api_key: args.api_key.clone(),
        endpoint: args.endpoint.clone(),
        cache_dir: args.cache_dir.clone(),
        workers: usize::from(args.concurrency),
        retry_attempts: u32::from(args.max_retries),
        request_delay: Duration::from_millis(args.request_delay),
        request_timeout: Duration::from_secs(args.timeout),
        sequential: args.sequential,
    };

    let engine = FetchEngine::new(&config)?;

    if args.clear_cache {
        let removed = engine.clear_cache().await?;
        info!(removed, "cache cleared");
    }

    let documents = engine.fetch_between(args.start, args.end).await?;

    let stats = engine.stats();
    let consolidated = consolidate(&documents, &stats)?;

    let output = args
        .output
        .unwrap_or_else(|| args.cache_dir.join("consolidated_fixtures.xml"));
    consolidated.write_to(&output).await?;

    let snapshot = stats.snapshot();
    info!(
        days_fetched = documents.len(),
        cache_hits = snapshot.cache_hits,
        network_calls = snapshot.network_calls,
        failures = snapshot.failures,
        total_items = snapshot.total_items,
        cache_hit_rate = format!("{:.2}%", snapshot.cache_hit_rate * 100.0),
        output = %output.display(),
        "Fetch complete"
    );

    if args.stats_json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}
