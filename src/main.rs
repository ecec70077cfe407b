// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing) on stderr
// 2. Parse command-line arguments using clap
// 3. Build a fetcher (real HTTP, or the built-in demo graph) and crawl
// 4. Print the report and exit with a proper code
//    (0 = every fetch succeeded, 1 = some fetches failed, 2 = error)
//
// Ctrl-C stops the crawl from starting new work; pages already being
// fetched finish and the partial report is still printed. A second Ctrl-C
// quits right away (exit code 130).
// =============================================================================

mod cli;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::{Cli, Commands};
use link_crawler::fetch::{CannedFetcher, HttpFetcher, HttpFetcherConfig};
use link_crawler::{Address, CrawlError, CrawlReport, Crawler, Fetcher};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays machine-readable.
// RUST_LOG overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every fetch succeeded
//   Ok(1) = some fetches failed
//   Err = the crawl could not run
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Site {
            website_url,
            json,
            max_depth,
            timeout_secs,
            any_domain,
        } => {
            let (start, restrict_to) = parse_root(&website_url, any_domain)?;

            let fetcher = HttpFetcher::new(HttpFetcherConfig {
                timeout: Duration::from_secs(timeout_secs),
                restrict_to,
                ..HttpFetcherConfig::default()
            })
            .context("failed to build HTTP client")?;

            if !json {
                println!("🔍 Crawling website: {}", start);
                println!("📊 Max crawl depth: {}", max_depth);
            }
            crawl_and_report(Arc::new(fetcher), Address::from(start.to_string()), max_depth, json)
                .await
        }
        Commands::Demo { json, max_depth } => {
            if !json {
                println!("🔍 Crawling built-in demo graph");
                println!("📊 Max crawl depth: {}", max_depth);
            }
            crawl_and_report(
                Arc::new(CannedFetcher::golang_site()),
                Address::from("http://golang.org/"),
                max_depth,
                json,
            )
            .await
        }
    }
}

// Validates the starting URL and works out which domain to stay on.
//
// The fragment is dropped, the same way discovered links lose theirs, so
// "https://x.com/#top" and a link to "https://x.com/" are one address.
fn parse_root(website_url: &str, any_domain: bool) -> Result<(Url, Option<String>), CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidRoot {
        address: website_url.to_string(),
        reason,
    };

    let mut start = Url::parse(website_url).map_err(|e| invalid(e.to_string()))?;
    start.set_fragment(None);

    let restrict_to = if any_domain {
        None
    } else {
        let domain = start
            .domain()
            .ok_or_else(|| invalid("URL has no domain".to_string()))?;
        Some(domain.to_string())
    };

    Ok((start, restrict_to))
}

// Watches for interrupts: the first one cancels the crawl, the second one
// returns true so the caller can quit without waiting for in-flight fetches.
// Returns false if the signal source fails.
async fn watch_interrupts<F, Fut>(cancel: CancellationToken, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    warn!("interrupted; letting in-flight fetches finish (Ctrl-C again to quit now)");
    cancel.cancel();

    next_signal().await.is_ok()
}

async fn crawl_and_report(
    fetcher: Arc<dyn Fetcher>,
    root: Address,
    max_depth: usize,
    json: bool,
) -> Result<i32> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if watch_interrupts(on_signal, tokio::signal::ctrl_c).await {
            error!("interrupted twice; quitting");
            std::process::exit(130);
        }
    });

    let report = Crawler::new(fetcher)
        .with_cancellation(cancel)
        .run(root, max_depth)
        .await?;

    print_report(&report, json)?;

    if report.has_failures() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints the report either as a table or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<8} {:<8} {:<30}", "URL", "DEPTH", "LINKS", "STATUS");
    println!("{}", "=".repeat(106));

    for page in &report.pages {
        println!(
            "{:<60} {:<8} {:<8} {:<30}",
            truncate(page.address.as_str()),
            page.depth,
            page.links.len(),
            "✅ FETCHED"
        );
    }
    for failure in &report.failures {
        println!(
            "{:<60} {:<8} {:<8} ❌ {}",
            truncate(failure.address.as_str()),
            "-",
            "-",
            failure.cause
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.pages.len());
    println!("   ❌ Failed: {}", report.failures.len());
    println!("   ⏹️  Not fetched (depth limit): {}", report.unfetched.len());
    println!("   🔁 Duplicate links skipped: {}", report.duplicates);
    if report.cancelled {
        println!("   ⚠️  Crawl was interrupted; results are partial");
    }
}

// Truncate URL if too long for display
fn truncate(url: &str) -> String {
    match url.char_indices().nth(57) {
        Some((idx, _)) => format!("{}...", &url[..idx]),
        None => url.to_string(),
    }
}
