//! site2pdf main entry point
//!
//! This is the command-line interface for binding a website into one PDF.

use anyhow::{bail, Context};
use clap::Parser;
use site2pdf::config::{load_config_with_hash, Config};
use site2pdf::crawler::HttpLoader;
use site2pdf::merge::LopdfMerger;
use site2pdf::progress::ProgressHub;
use site2pdf::render::ChromeRenderer;
use site2pdf::service::{ConversionResponse, ErrorBody, Service};
use site2pdf::{ConversionRequest, JobPipeline, JobRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

/// site2pdf: bind a website into a single PDF
///
/// Discovers same-origin pages breadth-first from URL, prints each one with
/// headless Chromium and merges the results into `merged.pdf`.
#[derive(Parser, Debug)]
#[command(name = "site2pdf")]
#[command(version = "1.0.0")]
#[command(about = "Bind a website into a single PDF", long_about = None)]
struct Cli {
    /// Seed URL (http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of pages to discover
    #[arg(short = 'n', long)]
    max_pages: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the output directory from the configuration
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the request and configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    if let Some(dir) = cli.output_dir.clone() {
        config.output.output_dir = dir;
    }

    let request = ConversionRequest::new(cli.url.clone(), cli.max_pages);

    if cli.dry_run {
        return handle_dry_run(config, &request);
    }

    handle_convert(config, &request, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site2pdf=info,warn"),
            1 => EnvFilter::new("site2pdf=debug,info"),
            2 => EnvFilter::new("site2pdf=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn build_service(config: Config) -> anyhow::Result<Service> {
    let loader = HttpLoader::new(&config.crawler).context("Failed to build HTTP client")?;
    let renderer = ChromeRenderer::new(config.renderer.clone());
    let registry = JobRegistry::new(ProgressHub::with_capacity(config.progress.channel_capacity));

    let pipeline = JobPipeline::new(
        config,
        registry,
        Arc::new(loader),
        Arc::new(renderer),
        Arc::new(LopdfMerger::new()),
    );
    Ok(Service::new(pipeline))
}

/// Handles --dry-run: validates the request and shows what would run
fn handle_dry_run(config: Config, request: &ConversionRequest) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let pipeline = service.pipeline();

    let (seed, budget) = match pipeline.validate(request) {
        Ok(resolved) => resolved,
        Err(e) => {
            print_json(&ErrorBody::from(&e))?;
            bail!(e);
        }
    };

    let config = pipeline.config();
    println!("=== site2pdf Dry Run ===\n");
    println!("Seed: {}", seed);
    println!("Page budget: {}", budget);
    println!("\nCrawler:");
    println!("  Links per page: {}", config.crawler.max_links_per_page);
    println!("  Page load timeout: {}s", config.crawler.page_load_timeout_secs);
    println!("\nRenderer:");
    println!("  Navigation timeout: {}s", config.renderer.navigation_timeout_secs);
    println!("  Settle delay: {}ms", config.renderer.settle_delay_ms);
    match &config.renderer.chrome_executable {
        Some(path) => println!("  Chrome: {}", path.display()),
        None => println!("  Chrome: auto-detect"),
    }
    println!("\nOutput: {}", pipeline.output_dir().display());
    println!("\n✓ Request is valid");

    Ok(())
}

/// Runs one conversion, streaming progress to stderr and the result to stdout
async fn handle_convert(
    config: Config,
    request: &ConversionRequest,
    quiet: bool,
) -> anyhow::Result<()> {
    let service = build_service(config)?;

    let mut started = match service.start(request).await {
        Ok(started) => started,
        Err(body) => {
            print_json(&body)?;
            bail!(body.error);
        }
    };
    tracing::info!("Job {} started", started.id);

    loop {
        match started.events.recv().await {
            Ok(event) => {
                if !quiet {
                    eprintln!(
                        "[{:>9}] {}/{} {}",
                        event.phase.as_str(),
                        event.current,
                        event.total,
                        event.message
                    );
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Progress display skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    match started.handle.await? {
        Ok(job) => {
            print_json(&ConversionResponse::from(&job))?;
            Ok(())
        }
        Err(e) => {
            print_json(&ErrorBody::from(&e))?;
            bail!(e);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
