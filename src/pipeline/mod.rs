//! Pipeline components: stage contract, queues, fan-out driver, orchestrator, error handling.

pub mod context;
pub mod error;
pub mod error_handler;
pub mod fan_out;
pub mod orchestrator;
pub mod source;
pub mod stage;

pub use context::{Cancel, Inbox, Outbox, PipelineChannels, create_pipeline_channels};
pub use error::{HashError, ItemError, ItemFailure, PipelineError};
pub use error_handler::{FirstError, check_for_first_error, record_first_error};
pub use fan_out::for_each_item;
pub use orchestrator::{Pipeline, RunningPipeline};
pub use source::{run_feed_loop, spawn_feed_thread};
pub use stage::{Stage, first_unaccepted};
