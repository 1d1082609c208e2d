//! Event dispatch and concurrency control
//!
//! The engine turns a stream of changed paths into linter results:
//!
//! ```text
//! watch thread ──▶ intake ──▶ Dispatcher ──▶ AdmissionLock
//!                                 │
//!                                 ▼ (one task per admitted path)
//!                          PipelineExecutor ──▶ CommandRunner × N
//!                                 │
//!                                 ▼
//!                           output channel ──▶ renderer
//! ```
//!
//! Everything runs on one tokio runtime. The only cross-thread boundary is the
//! intake channel: the watcher thread performs a single `send` per event and
//! touches nothing else.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lintwatch::engine::{
//!     AdmissionLock, CommandTemplate, Dispatcher, PipelineSpec, ProcessRunner, Stage,
//!     intake_channel, output_channel,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let pipeline = PipelineSpec::new(vec![Stage::Sequential(CommandTemplate::parse("flake8 {path}")?)])?;
//! let (intake_tx, intake_rx) = intake_channel();
//! let (output_tx, mut output_rx) = output_channel();
//! let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(AdmissionLock::new()),
//!     Arc::new(pipeline),
//!     Arc::new(ProcessRunner::new()),
//!     output_tx,
//! );
//! let running = tokio::spawn(dispatcher.run(intake_rx, stop_rx));
//!
//! intake_tx.send("/tmp/a.py".into())?;
//! drop(intake_tx);
//! running.await?;
//! let first = output_rx.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod admission;
pub mod dispatcher;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

pub use admission::{AdmissionGuard, AdmissionLock};
pub use dispatcher::{DispatchSummary, Dispatcher};
pub use output::{OutputMessage, OutputReceiver, OutputSender, ResultSink, consume, output_channel};
pub use pipeline::{PipelineExecutor, PipelineReport};
pub use runner::{CommandRunner, ProcessRunner};
pub use types::{CommandTemplate, PipelineSpec, ResultMessage, Stage};

/// Sending half of the intake channel; safe to use from any thread
pub type IntakeSender = UnboundedSender<PathBuf>;
pub type IntakeReceiver = UnboundedReceiver<PathBuf>;

/// Create the channel carrying changed paths into the dispatcher
pub fn intake_channel() -> (IntakeSender, IntakeReceiver) {
    unbounded_channel()
}
