//! Pipeline executor
//!
//! Runs every stage of the pipeline against one path. Stages are strictly
//! sequential; the commands inside a parallel stage are fanned out and all of
//! them are awaited before the next stage starts. Results are pushed to the
//! output channel the moment each command finishes.
//!
//! A command that fails or panics never cancels its siblings and never stops
//! downstream stages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use super::admission::AdmissionGuard;
use super::output::OutputSender;
use super::runner::CommandRunner;
use super::types::{CommandTemplate, PipelineSpec, ResultMessage};

/// What happened during one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub path: PathBuf,
    /// Results pushed to the output channel
    pub messages: usize,
    /// Commands whose task panicked or was cancelled
    pub failures: usize,
}

pub struct PipelineExecutor<R> {
    pipeline: Arc<PipelineSpec>,
    runner: Arc<R>,
    output: OutputSender,
}

impl<R> Clone for PipelineExecutor<R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            runner: Arc::clone(&self.runner),
            output: self.output.clone(),
        }
    }
}

impl<R: CommandRunner> PipelineExecutor<R> {
    pub fn new(pipeline: Arc<PipelineSpec>, runner: Arc<R>, output: OutputSender) -> Self {
        Self {
            pipeline,
            runner,
            output,
        }
    }

    /// Run the pipeline for the path held by `admission`, releasing it when the
    /// run ends. The guard also releases if this future panics or is dropped.
    pub async fn execute_admitted(self, admission: AdmissionGuard) -> PipelineReport {
        let report = self.execute(admission.path()).await;
        drop(admission);
        report
    }

    /// Run every stage in order against `path`
    pub async fn execute(&self, path: &Path) -> PipelineReport {
        let mut report = PipelineReport {
            path: path.to_path_buf(),
            ..Default::default()
        };

        for (index, stage) in self.pipeline.stages().iter().enumerate() {
            tracing::trace!("Stage {} for {}", index + 1, path.display());
            self.run_stage(stage.commands(), path, &mut report).await;
        }

        tracing::debug!(
            "Pipeline finished for {} ({} results, {} failures)",
            path.display(),
            report.messages,
            report.failures
        );
        report
    }

    /// Fan out the commands of one stage and wait for all of them
    async fn run_stage(&self, commands: &[CommandTemplate], path: &Path, report: &mut PipelineReport) {
        let mut batch = JoinSet::new();

        for command in commands {
            let runner = Arc::clone(&self.runner);
            let command = command.clone();
            let path = path.to_path_buf();
            batch.spawn(async move { runner.run(&command, &path).await });
        }

        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(message) => self.publish(message, report),
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!("Linter task for {} did not finish: {}", path.display(), e);
                }
            }
        }
    }

    fn publish(&self, message: ResultMessage, report: &mut PipelineReport) {
        if self.output.send(message) {
            report.messages += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::admission::AdmissionLock;
    use crate::engine::output::{OutputMessage, output_channel};
    use crate::engine::testing::{ScriptedRunner, Trace, spec};
    use std::time::Duration;

    fn drain(rx: &mut crate::engine::output::OutputReceiver) -> Vec<String> {
        let mut commands = Vec::new();
        while let Ok(OutputMessage::Result(message)) = rx.try_recv() {
            commands.push(message.command);
        }
        commands
    }

    #[tokio::test]
    async fn test_stage_ordering() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .delay("b", Duration::from_millis(60))
                .delay("c", Duration::from_millis(20)),
        );
        let (tx, mut rx) = output_channel();
        let executor = PipelineExecutor::new(
            Arc::new(spec(&[&["a"], &["b", "c"], &["d"]])),
            Arc::clone(&runner),
            tx,
        );

        let report = executor.execute(Path::new("x.py")).await;
        assert_eq!(report.messages, 4);
        assert_eq!(report.failures, 0);

        let trace = runner.trace();
        let finished = |name: &str| trace.iter().position(|t| *t == Trace::Finished(name.into())).unwrap();
        let started = |name: &str| trace.iter().position(|t| *t == Trace::Started(name.into())).unwrap();

        // A completes before B or C start
        assert!(finished("a") < started("b"));
        assert!(finished("a") < started("c"));
        // B and C overlap
        assert!(started("b") < finished("c") && started("c") < finished("b"));
        // D starts only after both B and C finished
        assert!(finished("b") < started("d"));
        assert!(finished("c") < started("d"));

        let pushed = drain(&mut rx);
        assert_eq!(pushed.first().map(String::as_str), Some("a"));
        assert_eq!(pushed.last().map(String::as_str), Some("d"));
        // C is faster, so it is pushed as soon as it finishes, ahead of B
        assert_eq!(pushed, vec!["a", "c", "b", "d"]);
    }

    #[tokio::test]
    async fn test_panicking_sibling_does_not_stop_pipeline() {
        let runner = Arc::new(ScriptedRunner::new().panics("b"));
        let (tx, mut rx) = output_channel();
        let executor = PipelineExecutor::new(
            Arc::new(spec(&[&["a", "b"], &["c"]])),
            runner,
            tx,
        );

        let report = executor.execute(Path::new("x.py")).await;

        assert_eq!(report.failures, 1);
        assert_eq!(report.messages, 2);
        let mut pushed = drain(&mut rx);
        pushed.sort();
        assert_eq!(pushed, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_releases_admission_when_done() {
        let lock = Arc::new(AdmissionLock::new());
        let (tx, _rx) = output_channel();
        let executor = PipelineExecutor::new(
            Arc::new(spec(&[&["a"]])),
            Arc::new(ScriptedRunner::new()),
            tx,
        );

        let guard = lock.try_admit(Path::new("x.py")).unwrap();
        executor.execute_admitted(guard).await;

        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_releases_admission_when_cancelled() {
        let lock = Arc::new(AdmissionLock::new());
        let (tx, _rx) = output_channel();
        let executor = PipelineExecutor::new(
            Arc::new(spec(&[&["slow"]])),
            Arc::new(ScriptedRunner::new().delay("slow", Duration::from_secs(30))),
            tx,
        );

        let guard = lock.try_admit(Path::new("x.py")).unwrap();
        let task = tokio::spawn(executor.execute_admitted(guard));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(lock.is_held(Path::new("x.py")));

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(lock.is_empty());
    }
}
