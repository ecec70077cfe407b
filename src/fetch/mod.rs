// src/fetch/mod.rs
// =============================================================================
// This module defines how the crawler gets a page and its links.
//
// The crawler itself never talks to the network. It only knows the Fetcher
// trait below. Two implementations live here:
// - http: real websites, via reqwest + scraper
// - canned: an in-memory link graph, for the demo and for tests
//
// Rust concepts:
// - Traits: a shared interface that different types implement
// - async-trait: lets a trait have async methods and still be used as
//   `dyn Fetcher` behind an Arc
// =============================================================================

mod canned;
mod http;

use async_trait::async_trait;

use crate::crawl::Address;
use crate::error::FetchError;

pub use canned::CannedFetcher;
pub use http::{HttpFetcher, HttpFetcherConfig};

/// What a successful fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Body of the document (page title for canned pages, HTML for real ones)
    pub content: String,
    /// Addresses this document links to, in document order
    pub links: Vec<Address>,
}

/// Retrieves a document and the addresses it links to.
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError>;
}
