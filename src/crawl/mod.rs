// src/crawl/mod.rs
// =============================================================================
// This module handles concurrent crawling of a link graph.
//
// Pieces (leaf first):
// - authority: the single owner of "which addresses were already claimed"
// - task: one unit of work per discovered link, spawned concurrently
// - driver: starts the root task and waits for the whole crawl to finish
//
// Every page is fetched at most once, no matter how many links point at it,
// and a task never reports "done" before all the tasks it spawned are done.
//
// Rust concepts:
// - Newtypes: Address wraps a String so it can't be mixed up with content
// - Atomics: TaskId values come from a lock-free counter
// =============================================================================

mod authority;
mod driver;
mod task;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use authority::VisitAuthority;
pub use driver::{run_crawl, Completion, CrawlReport, Crawler, FailedFetch, FetchedPage};

/// Opaque identifier of a document (in practice, a URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identity of one traversal task, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TaskId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// One pending unit of work: "visit this address with this much depth left".
// Created by the parent that discovered the link, consumed by the task
// that processes it.
#[derive(Debug, Clone)]
pub(crate) struct TraversalRequest {
    pub id: TaskId,
    pub parent: Option<TaskId>,
    pub address: Address,
    pub depth: usize,
    // Spawn generations from the root (root = 0)
    pub generation: usize,
}

impl TraversalRequest {
    pub fn root(address: Address, depth: usize) -> Self {
        Self {
            id: TaskId::next(),
            parent: None,
            address,
            depth,
            generation: 0,
        }
    }

    // Request for a link discovered by this task. Callers only build
    // children when depth > 0, so the subtraction cannot underflow.
    pub fn child(&self, link: Address) -> Self {
        Self {
            id: TaskId::next(),
            parent: Some(self.id),
            address: link,
            depth: self.depth - 1,
            generation: self.generation + 1,
        }
    }
}
