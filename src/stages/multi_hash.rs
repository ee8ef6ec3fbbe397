//! Indexed digest set: six checksums of `index ++ value`, joined in index order.

use std::sync::Arc;
use std::thread;

use crate::engine::HashPrimitives;
use crate::pipeline::{Inbox, ItemError, ItemFailure, Outbox, Stage, for_each_item};
use crate::utils::config::INDEXED_FAN_OUT;
use crate::{Concurrency, Item, ItemKind};

const NAME: &str = "multi_hash";
const ACCEPTS: &[ItemKind] = &[ItemKind::Text];
const EMITS: &[ItemKind] = &[ItemKind::Text];

/// Stage B.
pub struct MultiHash {
    primitives: Arc<dyn HashPrimitives>,
    concurrency: Concurrency,
}

impl MultiHash {
    pub fn new(primitives: Arc<dyn HashPrimitives>) -> Self {
        Self {
            primitives,
            concurrency: Concurrency::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// All sub-checksums start at once; handles are joined by index, so completion order
    /// never affects the result.
    pub fn sign(&self, value: &str) -> String {
        let primitives = self.primitives.as_ref();
        thread::scope(|s| {
            let parts: Vec<_> = (0..INDEXED_FAN_OUT)
                .map(|i| s.spawn(move || primitives.cheap(&format!("{i}{value}"))))
                .collect();
            parts
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .collect::<String>()
        })
    }
}

impl Stage for MultiHash {
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
        for_each_item(input, output, self.concurrency, |_, item| match item {
            Item::Text(value) => Ok(Item::Text(self.sign(&value))),
            other => Err(ItemError::UnexpectedKind {
                stage: NAME,
                expected: ACCEPTS,
                found: other.kind(),
            }),
        })
    }
}
