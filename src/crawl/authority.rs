// src/crawl/authority.rs
// =============================================================================
// The visit authority: the one place that decides whether an address may be
// fetched.
//
// How it works:
// 1. A background tokio task owns the visit set (a HashMap nobody else sees)
// 2. Tasks send it a ClaimRequest with a private oneshot reply channel
// 3. The owner handles requests one at a time: insert, then answer
//    "true" if the address was new, "false" otherwise
//
// Because a single task both checks and inserts, two concurrent claims for
// the same address can never both be told "true".
//
// Rust concepts:
// - mpsc channel: many senders (one per task), one receiver (the owner)
// - oneshot channel: a single reply to a single request
// - tokio::select!: wait on "new request" and "shut down" at the same time
// =============================================================================

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Address;
use crate::error::CrawlError;

// Queue depth between tasks and the owner. Senders wait when it is full.
const CLAIM_QUEUE: usize = 256;

// A question for the authority, with the channel to answer it on
struct ClaimRequest {
    address: Address,
    reply: oneshot::Sender<bool>,
}

/// Handle to a running visit authority.
///
/// Cheap to clone; every clone talks to the same owner task. The owner stops
/// when [`VisitAuthority::shutdown`] is called or every handle is dropped.
#[derive(Clone)]
pub struct VisitAuthority {
    requests: mpsc::Sender<ClaimRequest>,
    stop: CancellationToken,
}

impl VisitAuthority {
    /// Starts a fresh authority with an empty visit set.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(CLAIM_QUEUE);
        let stop = CancellationToken::new();

        tokio::spawn(serve(rx, stop.clone()));

        Self { requests: tx, stop }
    }

    /// Claims `address` for fetching.
    ///
    /// Returns `Ok(true)` for exactly one caller per distinct address over
    /// the authority's lifetime and `Ok(false)` for everyone else, including
    /// callers racing with the winner.
    pub async fn claim_if_new(&self, address: &Address) -> Result<bool, CrawlError> {
        let (reply, answer) = oneshot::channel();

        self.requests
            .send(ClaimRequest {
                address: address.clone(),
                reply,
            })
            .await
            .map_err(|_| CrawlError::AuthorityUnavailable)?;

        answer.await.map_err(|_| CrawlError::AuthorityUnavailable)
    }

    /// Tears the authority down. Every later claim fails with
    /// [`CrawlError::AuthorityUnavailable`].
    pub fn shutdown(&self) {
        self.stop.cancel();
    }
}

// The owner loop. The visit set lives here and only here.
async fn serve(mut requests: mpsc::Receiver<ClaimRequest>, stop: CancellationToken) {
    let mut visited: HashMap<Address, bool> = HashMap::new();

    loop {
        tokio::select! {
            // Shutdown wins over a queued request
            biased;
            _ = stop.cancelled() => break,
            msg = requests.recv() => match msg {
                Some(ClaimRequest { address, reply }) => {
                    let already = visited.insert(address, true).unwrap_or(false);
                    // The claimer may have given up waiting; nothing to do then
                    let _ = reply.send(!already);
                }
                None => break,
            }
        }
    }

    debug!(claimed = visited.len(), "visit authority stopped");
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why an actor instead of a Mutex<HashSet>?
//    - Both work. Here one task owns the map, so there is no lock at all:
//      requests simply queue up and are answered one by one
//    - When the owner is gone, senders get an error instead of a poisoned
//      lock, which maps cleanly to CrawlError::AuthorityUnavailable
//
// 2. What is a oneshot channel?
//    - A channel that carries exactly one value, then is done
//    - Each claim creates its own, so answers can never get mixed up
//      between callers
//
// 3. What does `biased;` do in select!?
//    - Normally select! picks randomly among ready branches
//    - biased checks them top to bottom, so a shutdown always wins over a
//      request that is already waiting in the queue
// -----------------------------------------------------------------------------
