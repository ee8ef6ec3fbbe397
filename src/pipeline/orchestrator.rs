//! Pipeline orchestrator: validates the stage chain, runs one thread per stage and
//! turns the first failure into the run's single result.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::context::{Cancel, Inbox, Outbox, create_pipeline_channels};
use super::error::PipelineError;
use super::error_handler::{FirstError, check_for_first_error, record_first_error};
use super::source::spawn_feed_thread;
use super::stage::{Stage, first_unaccepted};
use crate::Item;

/// An ordered, validated chain of stages. Built once per run and consumed by it.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    /// Build a pipeline from `stages` (first to last). Fails when the list is empty or a
    /// stage may receive a kind of item it does not accept.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::Empty);
        }
        for (i, pair) in stages.windows(2).enumerate() {
            let (upstream, stage) = (&pair[0], &pair[1]);
            if let Some(emits) = first_unaccepted(upstream.emits(), stage.accepts()) {
                return Err(PipelineError::Incompatible {
                    stage: i + 1,
                    name: stage.name(),
                    upstream: upstream.name(),
                    accepts: stage.accepts(),
                    emits,
                });
            }
        }
        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Start every stage. The caller feeds [`RunningPipeline::send`], closes the input and
    /// reads [`RunningPipeline::output`].
    pub fn spawn(self) -> Result<RunningPipeline, PipelineError> {
        self.spawn_with_cancel(Cancel::new())
    }

    /// Like [`spawn`](Self::spawn), observing an existing cancel flag (e.g. one set by Ctrl+C).
    pub fn spawn_with_cancel(self, cancel: Cancel) -> Result<RunningPipeline, PipelineError> {
        let channels = create_pipeline_channels(self.stages.len(), &cancel);
        let first_error: FirstError = Arc::new(Mutex::new(None));

        let mut handles = Vec::with_capacity(self.stages.len());
        for (position, (stage, (inbox, outbox))) in
            self.stages.into_iter().zip(channels.stage_io).enumerate()
        {
            let name = stage.name();
            match spawn_stage(position, stage, inbox, outbox, &first_error) {
                Ok(h) => handles.push(StageHandle {
                    position,
                    name,
                    handle: h,
                }),
                Err(source) => {
                    // Stages already started see the flag and wind down; join them before failing.
                    cancel.cancel();
                    join_stages(handles, &first_error, &cancel);
                    return Err(PipelineError::Spawn {
                        stage: position,
                        name,
                        source,
                    });
                }
            }
        }

        Ok(RunningPipeline {
            input: Some(channels.input_tx),
            output: channels.output_rx,
            handles,
            first_error,
            cancel,
        })
    }

    /// Run to completion over `seeds`: feed them, close the input, collect the final stage's
    /// output and join every stage. Any failure is returned instead of a result.
    pub fn run<I>(self, seeds: I) -> Result<Vec<Item>, PipelineError>
    where
        I: IntoIterator<Item = Item>,
        I::IntoIter: Send + 'static,
    {
        self.run_with_cancel(seeds, Cancel::new())
    }

    pub fn run_with_cancel<I>(self, seeds: I, cancel: Cancel) -> Result<Vec<Item>, PipelineError>
    where
        I: IntoIterator<Item = Item>,
        I::IntoIter: Send + 'static,
    {
        let mut running = self.spawn_with_cancel(cancel)?;
        let feed_handle = running
            .take_input()
            .map(|tx| spawn_feed_thread(tx, seeds, running.cancel_handle()));
        let result = running.collect();
        if let Some(h) = feed_handle {
            let _ = h.join();
        }
        result
    }
}

struct StageHandle {
    position: usize,
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Raises the cancel flag if the stage thread unwinds, before its outbox is dropped,
/// so downstream never mistakes a panic for a clean end-of-stream.
struct PanicGuard(Cancel);

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

fn spawn_stage(
    position: usize,
    stage: Box<dyn Stage>,
    mut inbox: Inbox,
    outbox: Outbox,
    first_error: &FirstError,
) -> std::io::Result<JoinHandle<()>> {
    let first_error = Arc::clone(first_error);
    let name = stage.name();
    thread::Builder::new()
        .name(format!("stage-{position}-{name}"))
        .spawn(move || {
            let cancel = inbox.cancel_handle().clone();
            let _guard = PanicGuard(cancel.clone());
            debug!("stage {} ({}) started", position, name);
            let result = stage.process(&mut inbox, &outbox);
            if let Err(failure) = result {
                record_first_error(
                    &first_error,
                    &cancel,
                    PipelineError::from_failure(position, name, failure),
                );
            }
            // End-of-stream for the next stage.
            drop(outbox);
            debug!(
                "stage {} ({}) finished after {} items",
                position,
                name,
                inbox.received()
            );
        })
}

fn join_stages(handles: Vec<StageHandle>, first_error: &FirstError, cancel: &Cancel) {
    for StageHandle {
        position,
        name,
        handle,
    } in handles
    {
        if handle.join().is_err() {
            record_first_error(
                first_error,
                cancel,
                PipelineError::Panicked {
                    stage: position,
                    name,
                },
            );
        }
    }
}

/// Handle to a started pipeline.
pub struct RunningPipeline {
    input: Option<Sender<Item>>,
    output: Receiver<Item>,
    handles: Vec<StageHandle>,
    first_error: FirstError,
    cancel: Cancel,
}

impl RunningPipeline {
    /// Feed one item to the first stage. False once the input was closed or the stage is gone.
    pub fn send(&self, item: Item) -> bool {
        self.input
            .as_ref()
            .is_some_and(|tx| tx.send(item).is_ok())
    }

    /// Signal end-of-input to the first stage.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Take the input sender to feed from elsewhere; dropping it closes the input.
    pub fn take_input(&mut self) -> Option<Sender<Item>> {
        self.input.take()
    }

    /// Final stage's output queue. Ends once every stage has finished.
    pub fn output(&self) -> &Receiver<Item> {
        &self.output
    }

    pub fn cancel_handle(&self) -> Cancel {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Close the input, join every stage in order and report the run's outcome.
    /// Items still queued on [`output`](Self::output) are left there.
    pub fn wait(mut self) -> Result<(), PipelineError> {
        self.close_input();
        join_stages(
            std::mem::take(&mut self.handles),
            &self.first_error,
            &self.cancel,
        );
        check_for_first_error(&self.first_error, &self.cancel)
    }

    /// Close the input, drain the final output and join. Returns the output only on success.
    pub fn collect(mut self) -> Result<Vec<Item>, PipelineError> {
        self.close_input();
        let mut items = Vec::new();
        while let Ok(item) = self.output.recv() {
            items.push(item);
        }
        debug!("main: output closed, {} items collected", items.len());
        self.wait()?;
        Ok(items)
    }
}
