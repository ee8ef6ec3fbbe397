//! Error types for stages and pipeline runs.

use thiserror::Error;

use crate::ItemKind;

/// Failure of a hash primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The exclusive digest was entered while another call was still in flight.
    #[error("expensive digest called concurrently (overheated)")]
    Overheated,
    #[error("hash primitive failed: {0}")]
    Failed(String),
}

/// Why a single item could not be processed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{stage} expects {expected:?}, got {found}")]
    UnexpectedKind {
        stage: &'static str,
        expected: &'static [ItemKind],
        found: ItemKind,
    },
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The run was cancelled while this item was in flight. Not reported as a failure.
    #[error("cancelled")]
    Cancelled,
}

/// An [`ItemError`] tagged with the item's arrival index at the failing stage.
#[derive(Debug, Error)]
#[error("item #{index}: {source}")]
pub struct ItemFailure {
    pub index: usize,
    #[source]
    pub source: ItemError,
}

impl ItemFailure {
    pub fn new(index: usize, source: ItemError) -> Self {
        Self { index, source }
    }
}

/// Terminal failure of a pipeline, surfaced to the caller as a single error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline has no stages")]
    Empty,
    #[error(
        "stage {stage} ({name}) accepts {accepts:?} but its upstream ({upstream}) may emit {emits}"
    )]
    Incompatible {
        stage: usize,
        name: &'static str,
        upstream: &'static str,
        accepts: &'static [ItemKind],
        emits: ItemKind,
    },
    #[error("stage {stage} ({name}) failed on item #{index}: {source}")]
    Item {
        stage: usize,
        name: &'static str,
        index: usize,
        #[source]
        source: ItemError,
    },
    #[error("failed to start stage {stage} ({name})")]
    Spawn {
        stage: usize,
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("stage {stage} ({name}) panicked")]
    Panicked { stage: usize, name: &'static str },
    #[error("pipeline run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Wrap a stage's [`ItemFailure`] with the stage position and name.
    pub fn from_failure(stage: usize, name: &'static str, failure: ItemFailure) -> Self {
        PipelineError::Item {
            stage,
            name,
            index: failure.index,
            source: failure.source,
        }
    }

    /// Position of the stage this error belongs to, when there is one.
    pub fn stage(&self) -> Option<usize> {
        match self {
            PipelineError::Incompatible { stage, .. }
            | PipelineError::Item { stage, .. }
            | PipelineError::Spawn { stage, .. }
            | PipelineError::Panicked { stage, .. } => Some(*stage),
            PipelineError::Empty | PipelineError::Cancelled => None,
        }
    }
}
