//! Sigflow: staged concurrent hashing pipeline with fan-out, an exclusive digest slot and ordered fan-in

pub mod engine;
pub mod pipeline;
pub mod stages;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::sync::Arc;

use engine::{ExclusiveToken, HashPrimitives, Signers};
use pipeline::{Cancel, Pipeline, PipelineError};
use stages::{CombineResults, MultiHash, SingleHash};

/// Result alias used by public sigflow API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Build the signing chain `single_hash → multi_hash → combine_results`.
///
/// `token` guards every `expensive` call of `primitives`; share one token between pipelines
/// that share an exclusive backend.
pub fn build_signer_pipeline(
    opts: &SignOpts,
    primitives: Arc<dyn HashPrimitives>,
    token: Arc<ExclusiveToken>,
) -> std::result::Result<Pipeline, PipelineError> {
    Pipeline::new(vec![
        Box::new(SingleHash::new(Arc::clone(&primitives), token).with_concurrency(opts.concurrency)),
        Box::new(MultiHash::new(primitives).with_concurrency(opts.concurrency)),
        Box::new(CombineResults::new(opts.delimiter.clone())),
    ])
}

/// Single entry point: sign `seeds` with the default CRC-32 / MD5 primitives and return the
/// combined result. Empty `seeds` yields the empty string.
///
/// ```ignore
/// let out = sigflow::sign_seeds(&[0.into(), 1.into()], &sigflow::SignOpts::default())?;
/// ```
pub fn sign_seeds(seeds: &[Item], opts: &SignOpts) -> Result<String> {
    sign_seeds_with_cancel(seeds, opts, Cancel::new())
}

/// [`sign_seeds`] observing an external cancel flag.
pub fn sign_seeds_with_cancel(seeds: &[Item], opts: &SignOpts, cancel: Cancel) -> Result<String> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    let primitives: Arc<dyn HashPrimitives> = Arc::new(Signers::new(opts.latency));
    let pipeline = build_signer_pipeline(opts, primitives, Arc::new(ExclusiveToken::new()))?;
    let output = pipeline.run_with_cancel(seeds.to_vec(), cancel)?;
    output
        .into_iter()
        .next()
        .and_then(Item::into_text)
        .ok_or_else(|| anyhow::anyhow!("collector produced no result"))
}
