//! Pipeline context: cancel flag, the inbox/outbox handed to each stage, and queue wiring.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::Item;
use crate::utils::config::CANCEL_POLL_INTERVAL;

/// Pipeline-wide cancel flag. Raised on the first stage failure or by the caller (e.g. Ctrl+C).
#[derive(Clone, Debug, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A stage's input: lazy sequence of `(arrival_index, item)`.
///
/// Iteration ends when the upstream closes and every queued item was taken, or when the
/// run is cancelled. Clones share the queue and the arrival counter, so a pool of workers
/// can pull from one inbox and still get distinct indices.
#[derive(Clone)]
pub struct Inbox {
    rx: Receiver<Item>,
    received: Arc<AtomicUsize>,
    cancel: Cancel,
}

impl Inbox {
    pub fn new(rx: Receiver<Item>, cancel: Cancel) -> Self {
        Self {
            rx,
            received: Arc::new(AtomicUsize::new(0)),
            cancel,
        }
    }

    /// True once the run was cancelled; a stage that sees this after draining must not emit.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_handle(&self) -> &Cancel {
        &self.cancel
    }

    /// Number of items taken so far (by this inbox and its clones).
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

impl Iterator for Inbox {
    type Item = (usize, Item);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            match self.rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(item) => {
                    let index = self.received.fetch_add(1, Ordering::Relaxed);
                    return Some((index, item));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

/// A stage's output sink. Dropping the last clone closes the downstream inbox.
#[derive(Clone)]
pub struct Outbox {
    tx: Sender<Item>,
}

impl Outbox {
    pub fn new(tx: Sender<Item>) -> Self {
        Self { tx }
    }

    /// Emit one item. Returns false when the downstream stage has already returned;
    /// that only happens after a failure or cancellation, so the item has nowhere to go.
    pub fn send(&self, item: Item) -> bool {
        self.tx.send(item).is_ok()
    }
}

/// Queues for an N-stage pipeline: N + 1 unbounded channels. Each stage's outbox feeds the
/// next stage's inbox; the caller writes `input_tx` and reads `output_rx`.
pub struct PipelineChannels {
    pub input_tx: Sender<Item>,
    pub output_rx: Receiver<Item>,
    pub stage_io: Vec<(Inbox, Outbox)>,
}

pub fn create_pipeline_channels(stage_count: usize, cancel: &Cancel) -> PipelineChannels {
    let (input_tx, mut rx) = unbounded::<Item>();
    let mut stage_io = Vec::with_capacity(stage_count);
    for _ in 0..stage_count {
        let (tx, next_rx) = unbounded::<Item>();
        stage_io.push((Inbox::new(rx, cancel.clone()), Outbox::new(tx)));
        rx = next_rx;
    }
    PipelineChannels {
        input_tx,
        output_rx: rx,
        stage_io,
    }
}
