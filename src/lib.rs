// src/lib.rs
// =============================================================================
// Library half of link-crawler. The binary (src/main.rs) is a thin CLI on
// top of what is exported here, so other programs can run crawls too.
//
// Modules:
// - crawl: the concurrent traversal (visit authority, tasks, driver)
// - fetch: the Fetcher trait plus the HTTP and in-memory fetchers
// - error: FetchError and CrawlError
// =============================================================================

pub mod crawl;
pub mod error;
pub mod fetch;

pub use crawl::{run_crawl, Address, CrawlReport, Crawler};
pub use error::{CrawlError, FetchError};
pub use fetch::{Fetcher, Page};
