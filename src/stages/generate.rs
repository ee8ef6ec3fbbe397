//! Source stage: emits a fixed seed list once and closes.

use crate::pipeline::{Inbox, ItemFailure, Outbox, Stage};
use crate::{Item, ItemKind};

const NAME: &str = "generate";
const SEED_KINDS: &[ItemKind] = &[ItemKind::Int, ItemKind::Text];
const ALL_KINDS: &[ItemKind] = &[ItemKind::Int, ItemKind::Text, ItemKind::Bytes];

/// Ignores its input queue. Declares `Bytes` among its outputs only when a seed is `Bytes`,
/// so such a list is rejected when the pipeline is built, not mid-run.
pub struct Generate {
    seeds: Vec<Item>,
    emits: &'static [ItemKind],
}

impl Generate {
    pub fn new(seeds: impl IntoIterator<Item = Item>) -> Self {
        let seeds: Vec<Item> = seeds.into_iter().collect();
        let emits = if seeds.iter().any(|s| s.kind() == ItemKind::Bytes) {
            ALL_KINDS
        } else {
            SEED_KINDS
        };
        Self { seeds, emits }
    }
}

impl Stage for Generate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn accepts(&self) -> &'static [ItemKind] {
        &[]
    }

    fn emits(&self) -> &'static [ItemKind] {
        self.emits
    }

    fn process(&self, input: &mut Inbox, output: &Outbox) -> Result<(), ItemFailure> {
        for seed in &self.seeds {
            if input.is_cancelled() || !output.send(seed.clone()) {
                break;
            }
        }
        Ok(())
    }
}
