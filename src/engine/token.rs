//! Exclusive Resource Token: a single-permit semaphore around the expensive digest.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-slot lock shared by every stage that calls the expensive digest.
/// Hold the returned guard only around the call itself.
#[derive(Debug, Default)]
pub struct ExclusiveToken {
    slot: Mutex<()>,
}

/// Held permit. Released on drop.
pub struct TokenGuard<'a> {
    _permit: MutexGuard<'a, ()>,
}

impl ExclusiveToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the permit is free, then take it.
    pub fn acquire(&self) -> TokenGuard<'_> {
        // A panic while holding the permit leaves no state behind; the slot is still usable.
        let permit = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        TokenGuard { _permit: permit }
    }

    /// Take the permit only if it is free right now.
    pub fn try_acquire(&self) -> Option<TokenGuard<'_>> {
        match self.slot.try_lock() {
            Ok(permit) => Some(TokenGuard { _permit: permit }),
            Err(std::sync::TryLockError::Poisoned(e)) => Some(TokenGuard {
                _permit: e.into_inner(),
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }
}
