mod cache;
mod calendar;
mod config;
mod error;
mod fetcher;
mod model;
mod parser;
mod pipeline;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use cache::CacheStore;
use config::Settings;
use fetcher::{CachingFetcher, HttpSource};

#[derive(Parser)]
#[command(
    name = "cff_calendar",
    about = "Scrape Cambridge Film Festival screenings into an ICS calendar"
)]
struct Cli {
    /// Where to write the calendar (default: cff.ics)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page cache directory (default: platform cache dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Refetch every page instead of reading the cache
    #[arg(long)]
    no_cache: bool,

    /// Only process the first N films
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Abort on the first film that fails to extract
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(output) = cli.output {
        settings.output = output;
    }
    if let Some(dir) = cli.cache_dir {
        settings.cache_dir = Some(dir);
    }
    settings.strict |= cli.strict;

    let cache = CacheStore::new(settings.cache_dir()?);
    info!("Page cache: {}", cache.dir().display());
    let source = HttpSource::new(Duration::from_secs(settings.timeout_secs))?;
    let mut fetcher = CachingFetcher::new(source, cache);
    if cli.no_cache {
        fetcher = fetcher.refresh();
    }

    let mut urls = parser::listing::list_film_urls(&fetcher, &settings)
        .await
        .context("Failed to read the festival listing")?;
    if let Some(n) = cli.limit {
        urls.truncate(n);
    }

    let harvest = pipeline::harvest(&fetcher, &urls, settings.festival_year, settings.strict).await?;
    for failure in &harvest.failures {
        warn!("Failed: {}: {}", failure.url, failure.error);
    }
    if harvest.films.is_empty() {
        anyhow::bail!("No films extracted ({} failed)", harvest.failures.len());
    }

    let ics = calendar::render(&harvest.films, Utc::now());
    std::fs::write(&settings.output, ics)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;

    let stats = fetcher.stats();
    println!(
        "Wrote {} events for {} films to {} ({} failed).",
        harvest.screening_count(),
        harvest.films.len(),
        settings.output.display(),
        harvest.failures.len()
    );
    println!(
        "Pages: {} from cache, {} fetched.",
        stats.cache_hits, stats.network_fetches
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
