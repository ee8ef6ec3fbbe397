//! Per-item driver shared by the fan-out stages: one task per item, or a fixed worker pool.

use std::sync::{Mutex, PoisonError};
use std::thread;

use super::context::{Cancel, Inbox, Outbox};
use super::error::{ItemError, ItemFailure};
use crate::{Concurrency, Item};

/// Run `work` on every item of `input` concurrently and emit each result on `output`.
///
/// Returns only after every accepted item has finished (scoped threads), so the caller may
/// close its output right after. The first failing item raises the cancel flag; the rest of
/// the inbox is left unread and the failure is returned. [`ItemError::Cancelled`] is dropped
/// quietly.
pub fn for_each_item<F>(
    input: &mut Inbox,
    output: &Outbox,
    concurrency: Concurrency,
    work: F,
) -> Result<(), ItemFailure>
where
    F: Fn(&Cancel, Item) -> Result<Item, ItemError> + Sync,
{
    let cancel = input.cancel_handle().clone();
    let first_failure: Mutex<Option<ItemFailure>> = Mutex::new(None);

    let handle_one = |index: usize, item: Item| match work(&cancel, item) {
        Ok(derived) => {
            let _ = output.send(derived);
        }
        Err(ItemError::Cancelled) => {}
        Err(source) => {
            first_failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert(ItemFailure::new(index, source));
            cancel.cancel();
        }
    };
    let handle_one = &handle_one;

    thread::scope(|s| match concurrency {
        Concurrency::PerItem => {
            for (index, item) in input.by_ref() {
                s.spawn(move || handle_one(index, item));
            }
        }
        Concurrency::Workers(n) => {
            for _ in 0..n.max(1) {
                let mut inbox = input.clone();
                s.spawn(move || {
                    for (index, item) in inbox.by_ref() {
                        handle_one(index, item);
                    }
                });
            }
        }
    });

    match first_failure
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
    {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}
