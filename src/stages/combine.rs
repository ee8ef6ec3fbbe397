//! Collector: barrier that sorts everything it received and joins it into one item.

use rayon::slice::ParallelSliceMut;

use crate::pipeline::{Inbox, ItemError, ItemFailure, Outbox, Stage};
use crate::utils::config::DEFAULT_DELIMITER;
use crate::{Item, ItemKind};

const NAME: &str = "combine_results";
const ACCEPTS: &[ItemKind] = &[ItemKind::Text];
const EMITS: &[ItemKind] = &[ItemKind::Text];

/// Emits nothing until its input ends, then exactly one item (empty string for no input).
pub struct CombineResults {
    delimiter: String,
}

impl Default for CombineResults {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl CombineResults {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Sort ascending (byte order) and join. Independent of arrival order.
    pub fn combine(&self, mut parts: Vec<String>) -> String {
        parts.par_sort_unstable();
        parts.join(&self.delimiter)
    }
}

impl Stage for CombineResults {
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
        let mut parts = Vec::new();
        for (index, item) in input.by_ref() {
            match item {
                Item::Text(s) => parts.push(s),
                other => {
                    return Err(ItemFailure::new(
                        index,
                        ItemError::UnexpectedKind {
                            stage: NAME,
                            expected: ACCEPTS,
                            found: other.kind(),
                        },
                    ));
                }
            }
        }
        // Input ended because of a failure elsewhere: a partial join is not a result.
        if input.is_cancelled() {
            return Ok(());
        }
        log::debug!("combining {} items", parts.len());
        output.send(Item::Text(self.combine(parts)));
        Ok(())
    }
}
