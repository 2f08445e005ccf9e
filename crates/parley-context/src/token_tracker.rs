//! Serialized token recalculation via an MPSC worker.
//!
//! Every history mutation sends a snapshot (`Vec<Arc<ContentEntry>>`, so
//! cloning is cheap) to a single consumer task. Only that task writes the
//! running total, so recalculations never interleave. Snapshots queued
//! behind one another are coalesced: only the newest is counted.
//! [`TokenTracker::flush`] resolves once every request sent before it has
//! been processed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parley_core::ContentEntry;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::errors::HistoryError;
use crate::token_counter::TokenCounter;

enum Request {
    Recalculate {
        generation: u64,
        snapshot: Vec<Arc<ContentEntry>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the token recalculation worker.
pub struct TokenTracker {
    tx: mpsc::UnboundedSender<Request>,
    total: Arc<AtomicU64>,
    worker_handle: tokio::task::JoinHandle<()>,
}

impl TokenTracker {
    /// Spawn the worker.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(counter: Arc<dyn TokenCounter>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let total = Arc::new(AtomicU64::new(0));
        let worker_handle = tokio::spawn(recalc_worker(rx, counter, Arc::clone(&total)));
        Self {
            tx,
            total,
            worker_handle,
        }
    }

    /// Queue a recalculation over `snapshot`. Never blocks.
    pub fn request(&self, generation: u64, snapshot: Vec<Arc<ContentEntry>>) {
        if self
            .tx
            .send(Request::Recalculate {
                generation,
                snapshot,
            })
            .is_err()
        {
            warn!(generation, "token worker stopped, recalculation dropped");
        }
    }

    /// Last computed total. May lag behind queued requests.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Wait until every earlier request has been processed, then return the total.
    pub async fn flush(&self) -> Result<u64, HistoryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(Request::Flush(reply_tx)).map_err(|_| {
            if self.worker_handle.is_finished() {
                debug!("token worker exited");
            }
            HistoryError::WorkerClosed
        })?;
        reply_rx.await.map_err(|_| HistoryError::WorkerClosed)?;
        Ok(self.total())
    }
}

impl Drop for TokenTracker {
    fn drop(&mut self) {
        self.worker_handle.abort();
    }
}

async fn recalc_worker(
    mut rx: mpsc::UnboundedReceiver<Request>,
    counter: Arc<dyn TokenCounter>,
    total: Arc<AtomicU64>,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut flushes = Vec::new();
        let mut coalesced = 0usize;

        let mut next = Some(first);
        while let Some(req) = next {
            match req {
                Request::Recalculate {
                    generation,
                    snapshot,
                } => {
                    if latest.is_some() {
                        coalesced += 1;
                    }
                    latest = Some((generation, snapshot));
                }
                Request::Flush(reply) => flushes.push(reply),
            }
            next = rx.try_recv().ok();
        }

        if let Some((generation, snapshot)) = latest {
            let tokens = counter.count_history(&snapshot);
            total.store(tokens, Ordering::Release);
            debug!(generation, tokens, coalesced, entries = snapshot.len(), "token total recalculated");
        }
        for reply in flushes {
            let _ = reply.send(());
        }
    }
}
