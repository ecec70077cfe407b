// src/crawl/driver.rs
// =============================================================================
// The crawl driver: starts the root task and waits for the whole crawl.
//
// How it works:
// 1. Start a fresh visit authority (empty visit set) for this run
// 2. Spawn the root task, reporting to a private "done" channel
// 3. Wait for the root's single completion signal. The root only sends it
//    once all of its children have, and so on down the tree, so at this
//    point no task of this run is still working.
// 4. Collect everything the tasks reported into a CrawlReport
//
// Individual fetch failures never fail the run. Only losing the visit
// authority does.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::task::{traverse, Event, TaskContext};
use super::{Address, TraversalRequest, VisitAuthority};
use crate::error::{CrawlError, FetchError};
use crate::fetch::Fetcher;

pub use super::task::Completion;

/// A page that was fetched successfully.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedPage {
    pub address: Address,
    /// Link hops from the root (the root itself is 0)
    pub depth: usize,
    /// Size of the body in bytes (the body itself is not kept)
    pub bytes: usize,
    pub links: Vec<Address>,
}

/// A page that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFetch {
    pub address: Address,
    pub cause: String,
}

impl From<FetchError> for FailedFetch {
    fn from(err: FetchError) -> Self {
        Self {
            address: err.address,
            cause: err.cause,
        }
    }
}

/// Everything one crawl run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub root: Address,
    pub max_depth: usize,
    /// Successful fetches, in the order they happened
    pub pages: Vec<FetchedPage>,
    pub failures: Vec<FailedFetch>,
    /// Claimed with no depth left, so never fetched
    pub unfetched: Vec<Address>,
    /// Tasks that found their address already claimed
    pub duplicates: usize,
    pub cancelled: bool,
    /// Task completions in the order they were signalled
    #[serde(skip)]
    pub completions: Vec<Completion>,
}

impl CrawlReport {
    fn new(root: Address, max_depth: usize) -> Self {
        Self {
            root,
            max_depth,
            pages: Vec::new(),
            failures: Vec::new(),
            unfetched: Vec::new(),
            duplicates: 0,
            cancelled: false,
            completions: Vec::new(),
        }
    }

    /// Was `address` fetched successfully?
    pub fn fetched(&self, address: &str) -> bool {
        self.pages.iter().any(|p| p.address.as_str() == address)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Configurable entry point for crawl runs.
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let report = Crawler::new(Arc::new(CannedFetcher::golang_site()))
///     .with_cancellation(token.clone())
///     .run(Address::from("http://golang.org/"), 4)
///     .await?;
/// ```
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            cancel: CancellationToken::new(),
        }
    }

    /// Once `token` is cancelled no new fetch or spawn starts; fetches
    /// already in flight finish and the run returns with `cancelled` set.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Crawls from `root`, fetching pages up to `max_depth` link hops away
    /// (depth 0 claims the root but fetches nothing).
    ///
    /// Returns once every task of the run has finished.
    pub async fn run(&self, root: Address, max_depth: usize) -> Result<CrawlReport, CrawlError> {
        if root.as_str().trim().is_empty() {
            return Err(CrawlError::InvalidRoot {
                address: root.to_string(),
                reason: "empty address".to_string(),
            });
        }

        let authority = VisitAuthority::spawn();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        // A lost authority cancels this run only, not the caller's token
        let ctx = Arc::new(TaskContext {
            fetcher: self.fetcher.clone(),
            authority: authority.clone(),
            events: events_tx,
            cancel: self.cancel.child_token(),
        });

        info!(root = %root, max_depth, "crawl started");

        let request = TraversalRequest::root(root.clone(), max_depth);
        tokio::spawn(traverse(request, ctx, done_tx));

        // Exactly one signal: the root's
        let _ = done_rx.recv().await;
        authority.shutdown();

        // Every event was sent before the root's signal, so nothing is
        // left in flight.
        let mut report = CrawlReport::new(root, max_depth);
        let mut authority_lost = false;
        while let Ok(event) = events_rx.try_recv() {
            match event {
                Event::Fetched {
                    address,
                    generation,
                    bytes,
                    links,
                } => report.pages.push(FetchedPage {
                    address,
                    depth: generation,
                    bytes,
                    links,
                }),
                Event::Failed(err) => report.failures.push(err.into()),
                Event::DepthExhausted(address) => report.unfetched.push(address),
                Event::Duplicate => report.duplicates += 1,
                Event::AuthorityLost => authority_lost = true,
                Event::Completed(completion) => report.completions.push(completion),
            }
        }
        report.cancelled = self.cancel.is_cancelled();

        if authority_lost {
            return Err(CrawlError::AuthorityUnavailable);
        }

        info!(
            pages = report.pages.len(),
            failures = report.failures.len(),
            duplicates = report.duplicates,
            cancelled = report.cancelled,
            "crawl finished"
        );

        Ok(report)
    }
}

/// Crawls from `root` with a fresh visit authority and no cancellation.
pub async fn run_crawl(
    root: Address,
    max_depth: usize,
    fetcher: Arc<dyn Fetcher>,
) -> Result<CrawlReport, CrawlError> {
    Crawler::new(fetcher).run(root, max_depth).await
}
