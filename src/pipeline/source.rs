//! Feed loop: pushes caller-supplied seeds into the first stage's queue, then closes it.

use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};

use super::context::Cancel;
use crate::Item;

/// Spawn a thread running [`run_feed_loop`] over `seeds`. The join handle yields the count sent.
pub fn spawn_feed_thread<I>(input_tx: Sender<Item>, seeds: I, cancel: Cancel) -> JoinHandle<usize>
where
    I: IntoIterator<Item = Item>,
    I::IntoIter: Send + 'static,
{
    let iter = seeds.into_iter();
    thread::spawn(move || run_feed_loop(input_tx, iter, &cancel))
}

/// Send every seed to `input_tx` until the iterator ends, the run is cancelled or the first
/// stage has gone away. Drops `input_tx` when done, which is the first stage's end-of-input.
pub fn run_feed_loop<I>(input_tx: Sender<Item>, seeds: I, cancel: &Cancel) -> usize
where
    I: Iterator<Item = Item>,
{
    let mut count = 0_usize;
    for seed in seeds {
        if cancel.is_cancelled() || input_tx.send(seed).is_err() {
            break;
        }
        count += 1;
    }
    drop(input_tx);
    log::debug!("feed: {} seeds sent, input closed", count);
    count
}
