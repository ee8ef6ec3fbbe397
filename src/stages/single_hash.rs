//! Paired digest: `cheap(v) ~ cheap(expensive(v))` per seed.

use std::sync::Arc;
use std::thread;

use crate::engine::{ExclusiveToken, HashPrimitives};
use crate::pipeline::{Cancel, Inbox, ItemError, ItemFailure, Outbox, Stage, for_each_item};
use crate::utils::config::PAIR_SEPARATOR;
use crate::{Concurrency, Item, ItemKind};

const NAME: &str = "single_hash";
const ACCEPTS: &[ItemKind] = &[ItemKind::Int, ItemKind::Text];
const EMITS: &[ItemKind] = &[ItemKind::Text];

/// Stage A. Items run concurrently; every `expensive` call goes through the shared token.
pub struct SingleHash {
    primitives: Arc<dyn HashPrimitives>,
    token: Arc<ExclusiveToken>,
    concurrency: Concurrency,
}

impl SingleHash {
    pub fn new(primitives: Arc<dyn HashPrimitives>, token: Arc<ExclusiveToken>) -> Self {
        Self {
            primitives,
            token,
            concurrency: Concurrency::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Compute the paired digest of one canonical value.
    ///
    /// The own checksum starts first and runs while this thread waits for the token; the
    /// token is held only for the `expensive` call.
    pub fn sign(&self, cancel: &Cancel, value: &str) -> Result<String, ItemError> {
        let primitives = self.primitives.as_ref();
        thread::scope(|s| {
            let own = s.spawn(|| primitives.cheap(value));
            let digest = {
                let _permit = self.token.acquire();
                if cancel.is_cancelled() {
                    return Err(ItemError::Cancelled);
                }
                primitives.expensive(value)?
            };
            let chained = s.spawn(move || primitives.cheap(&digest));

            let own = own.join().unwrap_or_else(|p| std::panic::resume_unwind(p));
            let chained = chained
                .join()
                .unwrap_or_else(|p| std::panic::resume_unwind(p));
            Ok(format!("{own}{PAIR_SEPARATOR}{chained}"))
        })
    }
}

/// Seed → canonical string: integers in decimal, text as-is.
fn canonical(item: Item) -> Result<String, ItemError> {
    match item {
        Item::Int(n) => Ok(n.to_string()),
        Item::Text(s) => Ok(s),
        other => Err(ItemError::UnexpectedKind {
            stage: NAME,
            expected: ACCEPTS,
            found: other.kind(),
        }),
    }
}

impl Stage for SingleHash {
    fn name(&self) -> &'static str {
        NAME
    }

    fn accepts(&self) -> &'static [ItemKind] {
        ACCEPTS
    }

    fn emits(&self) -> &'static [ItemKind] {
        EMITS
    }

    fn process(&self, input: &mut Inbox, output: &Outbox) -> Result<(), ItemFailure> {
        for_each_item(input, output, self.concurrency, |cancel, item| {
            let value = canonical(item)?;
            self.sign(cancel, &value).map(Item::Text)
        })
    }
}
