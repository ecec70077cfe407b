// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Crawl a website concurrently, visiting every reachable page at most once",
    long_about = "link-crawler follows links from a starting page in parallel, up to a maximum \
                  depth. Each page is fetched at most once no matter how many pages link to it. \
                  Set RUST_LOG (e.g. RUST_LOG=debug) to control log output on stderr."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a real website
    ///
    /// Example: link-crawler site https://example.com --max-depth 2
    Site {
        /// URL to start crawling from (e.g., https://example.com)
        website_url: String,

        /// Output the crawl report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Maximum crawl depth (default: 1)
        ///
        /// Depth 0 = fetch nothing
        /// Depth 1 = just the starting page
        /// Depth 2 = starting page + all pages it links to
        /// etc.
        #[arg(long, default_value_t = 1)]
        max_depth: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Follow links to other domains too
        #[arg(long)]
        any_domain: bool,
    },

    /// Crawl a small built-in copy of the golang.org link graph
    ///
    /// Handy for seeing the crawler work without touching the network.
    Demo {
        /// Output the crawl report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Maximum crawl depth (default: 4)
        #[arg(long, default_value_t = 4)]
        max_depth: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let cli = Cli::parse_from(["link-crawler", "site", "https://example.com"]);
        match cli.command {
            Commands::Site {
                website_url,
                json,
                max_depth,
                timeout_secs,
                any_domain,
            } => {
                assert_eq!(website_url, "https://example.com");
                assert!(!json);
                assert_eq!(max_depth, 1);
                assert_eq!(timeout_secs, 10);
                assert!(!any_domain);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_demo_flags() {
        let cli = Cli::parse_from(["link-crawler", "demo", "--json", "--max-depth", "0"]);
        assert!(matches!(
            cli.command,
            Commands::Demo {
                json: true,
                max_depth: 0
            }
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
