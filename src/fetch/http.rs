// src/fetch/http.rs
// =============================================================================
// A Fetcher that downloads real web pages.
//
// How it works:
// 1. GET the page with a shared reqwest Client (connection pooling)
// 2. Treat any non-2xx status as a failure
// 3. Parse the HTML with scraper and collect every <a href>
// 4. Resolve relative links against the page URL, keep only http/https,
//    and (by default) only links on the crawl's own domain
//
// The crawler decides what to do with the links; this file only finds them.
//
// Rust concepts:
// - reqwest::Client is cheap to clone and safe to share between tasks
// - scraper::Html is not Send, so parsing happens in a plain (non-async)
//   function and the document is dropped before we ever .await again
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::{Fetcher, Page};
use crate::crawl::Address;
use crate::error::FetchError;

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Only follow links on this domain (None = follow everything)
    pub restrict_to: Option<String>,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            restrict_to: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches pages over HTTP(S) and extracts their links.
pub struct HttpFetcher {
    client: Client,
    anchors: Selector,
    restrict_to: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let anchors =
            Selector::parse("a[href]").map_err(|e| anyhow!("invalid link selector: {:?}", e))?;

        Ok(Self {
            client,
            anchors,
            restrict_to: config.restrict_to,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError> {
        let fail = |cause: String| FetchError::new(address.clone(), cause);

        let response = self
            .client
            .get(address.as_str())
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let html = response.text().await.map_err(|e| fail(e.to_string()))?;
        let links = extract_links(
            &html,
            address.as_str(),
            &self.anchors,
            self.restrict_to.as_deref(),
        );

        Ok(Page {
            content: html,
            links,
        })
    }
}

// Extracts followable links from an HTML document
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//   anchors: the compiled "a[href]" selector
//   restrict_to: if set, drop links whose domain differs
//
// Returns: absolute URLs, in document order, duplicates removed
fn extract_links(
    html: &str,
    page_url: &str,
    anchors: &Selector,
    restrict_to: Option<&str>,
) -> Vec<Address> {
    let mut links: Vec<Address> = Vec::new();

    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return links,
    };

    let document = Html::parse_document(html);

    for element in document.select(anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(mut url) = resolve_link(&base, href) else {
            continue;
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }
        if let Some(domain) = restrict_to {
            if url.domain() != Some(domain) {
                continue;
            }
        }

        // "/docs#intro" and "/docs" are the same document
        url.set_fragment(None);
        let address = Address::from(url.to_string());
        if !links.contains(&address) {
            links.push(address);
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    // Skip anchors and special protocols
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    base.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> Selector {
        Selector::parse("a[href]").unwrap()
    }

    #[test]
    fn test_resolve_absolute_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "https://other.com").map(|u| u.to_string());
        assert_eq!(result, Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "/docs").map(|u| u.to_string());
        assert_eq!(result, Some("https://example.com/docs".to_string()));
    }

    #[test]
    fn test_skip_anchor_and_mailto() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "#section"), None);
        assert_eq!(resolve_link(&base, "mailto:test@example.com"), None);
    }

    #[test]
    fn test_extract_keeps_same_domain_only() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a href="https://other.com/x">Elsewhere</a>
            <a href="../about">About</a>
        "#;
        let links = extract_links(
            html,
            "https://example.com/page/",
            &anchors(),
            Some("example.com"),
        );
        assert_eq!(
            links,
            vec![
                Address::from("https://example.com/docs"),
                Address::from("https://example.com/about"),
            ]
        );
    }

    #[test]
    fn test_extract_any_domain_when_unrestricted() {
        let html = r#"<a href="https://other.com/x">Elsewhere</a>"#;
        let links = extract_links(html, "https://example.com/", &anchors(), None);
        assert_eq!(links, vec![Address::from("https://other.com/x")]);
    }

    #[test]
    fn test_extract_drops_fragments_and_duplicates() {
        let html = r##"
            <a href="/docs#intro">Intro</a>
            <a href="/docs">Docs</a>
            <a href="ftp://example.com/file">FTP</a>
        "##;
        let links = extract_links(html, "https://example.com/", &anchors(), None);
        assert_eq!(links, vec![Address::from("https://example.com/docs")]);
    }

    #[test]
    fn test_invalid_page_url_yields_no_links() {
        let links = extract_links(r#"<a href="/docs">Docs</a>"#, "not a url", &anchors(), None);
        assert!(links.is_empty());
    }
}
