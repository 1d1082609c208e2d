//! Dispatcher
//!
//! Pulls change events from the intake channel, admits each path through the
//! [`AdmissionLock`] and spawns one pipeline task per admitted path. Events for
//! a path that is already running are dropped: a second edit during an
//! in-flight run does not schedule a follow-up run.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

use super::admission::AdmissionLock;
use super::output::OutputSender;
use super::pipeline::{PipelineExecutor, PipelineReport};
use super::runner::CommandRunner;
use super::types::PipelineSpec;
use super::IntakeReceiver;

/// Counters for one dispatcher lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Events pulled from the intake channel
    pub received: usize,
    /// Events that started a pipeline
    pub admitted: usize,
    /// Events dropped because their path was already running
    pub dropped: usize,
    /// Pipelines that ran to the end
    pub completed: usize,
    /// Pipelines that panicked
    pub failed: usize,
    /// Pipelines aborted by shutdown
    pub cancelled: usize,
}

pub struct Dispatcher<R> {
    lock: Arc<AdmissionLock>,
    executor: PipelineExecutor<R>,
    tasks: JoinSet<PipelineReport>,
    summary: DispatchSummary,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(
        lock: Arc<AdmissionLock>,
        pipeline: Arc<PipelineSpec>,
        runner: Arc<R>,
        output: OutputSender,
    ) -> Self {
        Self {
            lock,
            executor: PipelineExecutor::new(pipeline, runner, output),
            tasks: JoinSet::new(),
            summary: DispatchSummary::default(),
        }
    }

    /// Handle one change event. Returns `true` when a pipeline task was spawned.
    ///
    /// Never waits on the spawned task. Must be called from within a tokio runtime.
    pub fn on_event(&mut self, path: PathBuf) -> bool {
        self.summary.received += 1;

        let Some(admission) = self.lock.try_admit(&path) else {
            self.summary.dropped += 1;
            tracing::debug!("{} is already being linted, dropping event", path.display());
            return false;
        };

        tracing::info!("Linting {}", path.display());
        self.summary.admitted += 1;
        self.tasks.spawn(self.executor.clone().execute_admitted(admission));
        true
    }

    /// Number of pipelines currently running
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn summary(&self) -> DispatchSummary {
        self.summary
    }

    /// Main loop.
    ///
    /// Runs until the intake channel closes, then waits for in-flight pipelines.
    /// When `shutdown` flips to `true` (or its sender is dropped) admission stops
    /// immediately and in-flight pipelines are aborted.
    pub async fn run(
        mut self,
        mut intake: IntakeReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) -> DispatchSummary {
        let mut intake_open = true;

        loop {
            if *shutdown.borrow_and_update() {
                self.cancel_in_flight().await;
                break;
            }
            if !intake_open && self.tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Shutdown signal dropped, cancelling in-flight pipelines");
                        self.cancel_in_flight().await;
                        break;
                    }
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.reap(joined);
                }
                event = intake.recv(), if intake_open => match event {
                    Some(path) => {
                        self.on_event(path);
                    }
                    None => {
                        tracing::debug!(
                            "Intake closed, waiting for {} in-flight pipelines",
                            self.tasks.len()
                        );
                        intake_open = false;
                    }
                },
            }
        }

        tracing::debug!("Dispatcher stopped: {:?}", self.summary);
        self.summary
    }

    fn reap(&mut self, joined: Result<PipelineReport, JoinError>) {
        match joined {
            Ok(report) => {
                self.summary.completed += 1;
                tracing::debug!("Done with {} ({} results)", report.path.display(), report.messages);
            }
            Err(e) if e.is_cancelled() => {
                self.summary.cancelled += 1;
            }
            Err(e) => {
                self.summary.failed += 1;
                tracing::warn!("Pipeline task failed: {}", e);
            }
        }
    }

    async fn cancel_in_flight(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        tracing::info!("Cancelling {} in-flight pipelines", self.tasks.len());

        self.tasks.abort_all();
        while let Some(joined) = self.tasks.join_next().await {
            self.reap(joined);
        }
    }
}
