use std::sync::{Arc, Mutex, PoisonError};

use super::context::Cancel;
use super::error::PipelineError;

/// First failure of a run, shared by all stage threads.
pub type FirstError = Arc<Mutex<Option<PipelineError>>>;

/// Record `err` if nothing was recorded yet, then raise the cancel flag so sibling stages stop.
/// Later failures are usually fallout from the first one and are only logged.
pub fn record_first_error(first_error: &FirstError, cancel: &Cancel, err: PipelineError) {
    {
        let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            None => {
                log::error!("{}", err);
                *slot = Some(err);
            }
            Some(_) => log::debug!("suppressed after first failure: {}", err),
        }
    }
    cancel.cancel();
}

/// Check the run after all stages were joined: the recorded failure wins, otherwise a raised
/// cancel flag means the caller cancelled.
pub fn check_for_first_error(
    first_error: &FirstError,
    cancel: &Cancel,
) -> Result<(), PipelineError> {
    if let Some(err) = first_error
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        return Err(err);
    }
    if cancel.is_cancelled() {
        log::warn!("Pipeline run cancelled before completion");
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}
