// src/fetch/canned.rs
// =============================================================================
// A Fetcher that answers from an in-memory map instead of the network.
//
// Used by the `demo` subcommand (a small copy of the Go website's link
// graph) and by the crawler's tests, where we need a graph whose shape we
// control exactly.
//
// Unknown addresses fail with "not found", just like a 404 would.
// =============================================================================

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Fetcher, Page};
use crate::crawl::Address;
use crate::error::FetchError;

/// In-memory link graph.
#[derive(Debug, Clone, Default)]
pub struct CannedFetcher {
    pages: HashMap<Address, Page>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) one page and its outgoing links.
    pub fn with_page(mut self, address: &str, content: &str, links: &[&str]) -> Self {
        self.pages.insert(
            Address::from(address),
            Page {
                content: content.to_string(),
                links: links.iter().map(|l| Address::from(*l)).collect(),
            },
        );
        self
    }

    /// The dataset the `demo` subcommand crawls.
    ///
    /// `http://golang.org/cmd/` is linked to but has no page, so a crawl of
    /// this graph always reports one failure.
    pub fn golang_site() -> Self {
        Self::new()
            .with_page(
                "http://golang.org/",
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            )
            .with_page(
                "http://golang.org/pkg/",
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "http://golang.org/pkg/fmt/",
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
            .with_page(
                "http://golang.org/pkg/os/",
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError> {
        self.pages
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::new(address.clone(), format!("not found: {}", address)))
    }
}
