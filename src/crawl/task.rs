// src/crawl/task.rs
// =============================================================================
// One traversal task: visit one address, then everything reachable from it.
//
// Steps, in order:
// 1. Arm a CompletionGuard. When it is dropped (normal return, early
//    return, or panic) it tells the parent "this task is done".
// 2. Stop if the crawl was cancelled.
// 3. Ask the visit authority for the address. Someone else got it? Stop.
// 4. No depth left? Stop. (The address stays claimed but is not fetched.)
// 5. Fetch. On failure, log it and stop; nobody else is affected.
// 6. Spawn one child task per link, each reporting to a channel private
//    to this task.
// 7. Wait until every child has reported, then let the guard fire.
//
// Rust concepts:
// - Drop: the guard's drop() runs on every exit path, panics included
// - BoxFuture: a task spawns copies of itself, and a recursive async type
//   needs a box to have a known size
// =============================================================================

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{Address, TaskId, TraversalRequest, VisitAuthority};
use crate::error::FetchError;
use crate::fetch::Fetcher;

/// Record of one finished task, as seen by the results log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: TaskId,
    pub parent: Option<TaskId>,
    pub address: Address,
}

// Everything a task reports to the driver's results log
#[derive(Debug)]
pub(crate) enum Event {
    Fetched {
        address: Address,
        generation: usize,
        bytes: usize,
        links: Vec<Address>,
    },
    Failed(FetchError),
    DepthExhausted(Address),
    Duplicate,
    AuthorityLost,
    Completed(Completion),
}

// Shared by every task of one crawl run
pub(crate) struct TaskContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub authority: VisitAuthority,
    pub events: mpsc::UnboundedSender<Event>,
    pub cancel: CancellationToken,
}

impl TaskContext {
    fn record(&self, event: Event) {
        // The driver keeps the receiver alive until the root task is done
        let _ = self.events.send(event);
    }
}

// Emits the completion signal when dropped.
//
// The completion is logged before the parent is notified, so in the
// results log a child always appears before its parent.
pub(crate) struct CompletionGuard {
    completion: Completion,
    events: mpsc::UnboundedSender<Event>,
    done: mpsc::UnboundedSender<Address>,
}

impl CompletionGuard {
    pub fn new(
        request: &TraversalRequest,
        events: mpsc::UnboundedSender<Event>,
        done: mpsc::UnboundedSender<Address>,
    ) -> Self {
        Self {
            completion: Completion {
                task: request.id,
                parent: request.parent,
                address: request.address.clone(),
            },
            events,
            done,
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self
            .events
            .send(Event::Completed(self.completion.clone()));
        let _ = self.done.send(self.completion.address.clone());
    }
}

// Runs one traversal task to completion, including all of its descendants.
//
// `done` is the parent's private join channel. Exactly one address is sent
// on it, whatever happens in here.
pub(crate) fn traverse(
    request: TraversalRequest,
    ctx: Arc<TaskContext>,
    done: mpsc::UnboundedSender<Address>,
) -> BoxFuture<'static, ()> {
    // Built outside the future so it fires even if the future is dropped
    // before its first poll.
    let guard = CompletionGuard::new(&request, ctx.events.clone(), done);

    async move {
        let _guard = guard;

        if ctx.cancel.is_cancelled() {
            return;
        }

        let address = &request.address;

        match ctx.authority.claim_if_new(address).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(task = %request.id, address = %address, "already claimed");
                ctx.record(Event::Duplicate);
                return;
            }
            Err(err) => {
                error!(
                    task = %request.id,
                    address = %address,
                    error = err.as_label(),
                    "{}",
                    err
                );
                ctx.record(Event::AuthorityLost);
                // Nothing can be fetched safely any more
                ctx.cancel.cancel();
                return;
            }
        }

        if request.depth == 0 {
            debug!(task = %request.id, address = %address, "depth exhausted");
            ctx.record(Event::DepthExhausted(address.clone()));
            return;
        }

        let page = match ctx.fetcher.fetch(address).await {
            Ok(page) => page,
            Err(err) => {
                warn!(task = %request.id, error = err.as_label(), "{}", err);
                ctx.record(Event::Failed(err));
                return;
            }
        };

        info!(
            task = %request.id,
            address = %address,
            depth = request.depth,
            links = page.links.len(),
            "found: {:?}",
            preview(&page.content)
        );

        // The body is not kept; only its size and links travel further
        let links = page.links.clone();
        ctx.record(Event::Fetched {
            address: address.clone(),
            generation: request.generation,
            bytes: page.content.len(),
            links: page.links,
        });

        if ctx.cancel.is_cancelled() {
            return;
        }

        // Fan out. Each child reports on our private channel.
        let (tx, mut rx) = mpsc::unbounded_channel();
        for link in links {
            tokio::spawn(traverse(request.child(link), ctx.clone(), tx.clone()));
        }
        drop(tx);

        // Fan in. Once every child's guard has fired, all senders are gone
        // and recv() returns None.
        while rx.recv().await.is_some() {}
    }
    .boxed()
}

// First line of a page body, capped, for the log
fn preview(content: &str) -> &str {
    let line = content.lines().next().unwrap_or("");
    match line.char_indices().nth(60) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a "drop guard"?
//    - A value whose only job is to run code in its Drop impl
//    - Rust calls drop() when the value goes out of scope, on every path:
//      a normal return, an early `return`, or a panic unwinding the task
//    - Like Go's `defer` or a `finally` block, but tied to a value
//
// 2. Why is the guard built outside the async block?
//    - An async block does nothing until it is polled
//    - If the guard were created inside, a future that is dropped before
//      its first poll would never create it, and the parent would never
//      hear back. Built outside, it lives in the future and drops with it
//
// 3. How does the parent know all children are done?
//    - Every child holds a clone of the parent's Sender (inside its guard)
//    - recv() returns None only when every Sender is gone
//    - So `while rx.recv().await.is_some() {}` is a wait-group
//
// 4. Why BoxFuture?
//    - traverse() spawns more traverse() futures. An async fn that contains
//      itself would have an infinitely large type
//    - Boxing gives the future a fixed size (one pointer)
// -----------------------------------------------------------------------------
