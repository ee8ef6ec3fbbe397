//! The stage contract.

use super::context::{Inbox, Outbox};
use super::error::ItemFailure;
use crate::ItemKind;

/// One processing unit of a [`Pipeline`](super::Pipeline).
///
/// `process` consumes `input` until it ends and emits zero or more items on `output`.
/// It must not return while any item it accepted is still being worked on; the
/// orchestrator closes the downstream queue as soon as it returns.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Kinds this stage takes. Empty means it is a source and ignores its input.
    fn accepts(&self) -> &'static [ItemKind];

    /// Kinds this stage may emit.
    fn emits(&self) -> &'static [ItemKind];

    fn process(&self, input: &mut Inbox, output: &Outbox) -> Result<(), ItemFailure>;
}

/// First kind in `upstream_emits` that `accepts` does not cover. Sources never mismatch.
pub fn first_unaccepted(
    upstream_emits: &[ItemKind],
    accepts: &[ItemKind],
) -> Option<ItemKind> {
    if accepts.is_empty() {
        return None;
    }
    upstream_emits.iter().copied().find(|k| !accepts.contains(k))
}
