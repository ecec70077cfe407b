// tests/crawl_api.rs
// =============================================================================
// Runs crawls through the library's public API, the way a program that
// depends on link-crawler would.
// =============================================================================

use std::sync::Arc;

use link_crawler::crawl::{Completion, FailedFetch, FetchedPage};
use link_crawler::fetch::CannedFetcher;
use link_crawler::{run_crawl, Address, CrawlError, CrawlReport};

fn graph() -> CannedFetcher {
    CannedFetcher::new()
        .with_page("A", "page a", &["B", "C"])
        .with_page("B", "page b", &["A", "C", "D", "E"])
        .with_page("C", "page c", &["A", "B"])
        .with_page("D", "page d", &["A", "B"])
        .with_page("E", "page e", &[])
}

#[tokio::test]
async fn test_run_crawl_is_usable_from_outside() {
    let report: CrawlReport = run_crawl(Address::from("A"), 4, Arc::new(graph()))
        .await
        .unwrap();

    for name in ["A", "B", "C", "D", "E"] {
        assert!(report.fetched(name));
    }

    let root: &Completion = report.completions.last().unwrap();
    assert_eq!(root.address, Address::from("A"));
}

#[tokio::test]
async fn test_pages_keep_size_and_links_not_body() {
    let report = run_crawl(Address::from("A"), 1, Arc::new(graph()))
        .await
        .unwrap();

    let page: &FetchedPage = &report.pages[0];
    assert_eq!(page.address, Address::from("A"));
    assert_eq!(page.bytes, "page a".len());
    assert_eq!(page.links, vec![Address::from("B"), Address::from("C")]);
}

#[tokio::test]
async fn test_failures_are_collected() {
    let fetcher = CannedFetcher::new().with_page("A", "page a", &["missing"]);
    let report = run_crawl(Address::from("A"), 2, Arc::new(fetcher))
        .await
        .unwrap();

    let expected = FailedFetch {
        address: Address::from("missing"),
        cause: "not found: missing".to_string(),
    };
    assert_eq!(report.failures, vec![expected]);
}

#[tokio::test]
async fn test_empty_root_is_an_error() {
    let err = run_crawl(Address::from(""), 2, Arc::new(graph()))
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::InvalidRoot { .. }));
}
