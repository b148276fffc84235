//! Bounded worker pool: fan per-item processing out over OS threads and
//! collect outcomes unordered as they complete.

use anyhow::Result;
use crossbeam_channel::{Receiver, bounded};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::engine::progress::{maybe_progress_bar, refresh_bar, update_progress_bar};
use crate::pipeline::processor::process_item;
use crate::types::{ItemOutcome, Opts, WorkItem};
use crate::utils::config::OUTCOME_CHANNEL_CAP;

/// Handles for a running pool: receive outcomes, then join feeder and workers.
pub struct PoolHandles {
    pub outcome_rx: Receiver<ItemOutcome>,
    /// Returns how many items were actually submitted (less than the total
    /// when cancelled).
    pub feeder_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Spawn the feeder thread and `C` worker threads over `items`.
///
/// Items travel over a rendezvous channel, so "submitted" means "picked up by
/// a worker": once `cancel` is set, nothing more starts, but every invocation
/// already running finishes (no kill, no half-written artifacts).
pub fn spawn_pool(items: Vec<WorkItem>, opts: &Opts, cancel: Arc<AtomicBool>) -> PoolHandles {
    let num_workers = opts.effective_concurrency().min(items.len()).max(1);
    debug!("worker pool size: {}", num_workers);

    let (item_tx, item_rx) = bounded::<WorkItem>(0);
    let (outcome_tx, outcome_rx) = bounded::<ItemOutcome>(OUTCOME_CHANNEL_CAP);

    let feeder_handle = thread::spawn(move || {
        let mut submitted = 0usize;
        for item in items {
            if cancel.load(Ordering::SeqCst) {
                warn!("cancellation requested - no further repositories submitted");
                break;
            }
            if item_tx.send(item).is_err() {
                break;
            }
            submitted += 1;
        }
        drop(item_tx);
        submitted
    });

    let worker_handles: Vec<_> = (0..num_workers)
        .map(|_| {
            let item_rx = item_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let opts = opts.clone();
            thread::spawn(move || {
                while let Ok(item) = item_rx.recv() {
                    let outcome = process_item(&item, &opts);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                drop(outcome_tx);
            })
        })
        .collect();

    // Dropping the last sender closes the channel so the collector sees EOF.
    drop(outcome_tx);

    PoolHandles {
        outcome_rx,
        feeder_handle,
        worker_handles,
    }
}

/// Run the pool to completion and collect every outcome, unordered. Fully
/// drains: one item's failure never suppresses another's outcome.
pub fn run_pool(
    items: Vec<WorkItem>,
    opts: &Opts,
    cancel: Arc<AtomicBool>,
) -> Result<Vec<ItemOutcome>> {
    let total = items.len();
    let handles = spawn_pool(items, opts, cancel);

    let pb = maybe_progress_bar(opts.progress, total, "repositories");
    refresh_bar(&pb);

    let mut outcomes = Vec::with_capacity(total);
    while let Ok(outcome) = handles.outcome_rx.recv() {
        outcomes.push(outcome);
        update_progress_bar(&pb, 1);
    }

    let submitted = handles
        .feeder_handle
        .join()
        .map_err(|_| anyhow::anyhow!("feeder thread panicked"))?;
    for handle in handles.worker_handles {
        let _ = handle.join();
    }
    debug!(
        "pool drained: {} outcomes for {} submitted of {} items",
        outcomes.len(),
        submitted,
        total
    );
    Ok(outcomes)
}
