//! Wires the engine together for one CLI invocation
//!
//! A session owns the intake channel, the dispatcher task and the output
//! consumer task. Shutdown follows a fixed order: stop admitting work, let the
//! dispatcher finish (or cancel it), then push the sentinel so the consumer
//! drains everything already produced and stops.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::LintwatchConfig;
use crate::engine::{
    AdmissionLock, DispatchSummary, Dispatcher, IntakeSender, OutputSender, PipelineSpec,
    ProcessRunner, Stage, consume, intake_channel, output_channel,
};
use crate::render::Renderer;

pub struct Session {
    intake: IntakeSender,
    output: OutputSender,
    stop: watch::Sender<bool>,
    dispatcher: JoinHandle<DispatchSummary>,
    consumer: JoinHandle<usize>,
}

impl Session {
    /// Start the dispatcher and the output consumer. Linters run inside `work_dir`.
    pub fn start(pipeline: PipelineSpec, config: &LintwatchConfig, work_dir: &Path, renderer: Renderer) -> Self {
        let (intake, intake_rx) = intake_channel();
        let (output, output_rx) = output_channel();
        let (stop, stop_rx) = watch::channel(false);

        let runner = ProcessRunner::new()
            .with_timeout(config.timeout())
            .with_working_dir(work_dir);
        let dispatcher = Dispatcher::new(
            Arc::new(AdmissionLock::new()),
            Arc::new(pipeline),
            Arc::new(runner),
            output.clone(),
        );

        let dispatcher = tokio::spawn(dispatcher.run(intake_rx, stop_rx));
        let consumer = tokio::spawn(async move {
            let mut renderer = renderer;
            consume(output_rx, &mut renderer).await
        });

        Self {
            intake,
            output,
            stop,
            dispatcher,
            consumer,
        }
    }

    /// Another handle onto the intake channel, e.g. for the watch bridge
    pub fn intake(&self) -> IntakeSender {
        self.intake.clone()
    }

    /// Stop the session.
    ///
    /// With `cancel` the pipelines still running are aborted; otherwise they are
    /// awaited once every intake sender is gone.
    pub async fn finish(self, cancel: bool) -> Result<DispatchSummary> {
        drop(self.intake);
        if cancel {
            // The dispatcher may already have stopped on its own
            let _ = self.stop.send(true);
        }

        let summary = self.dispatcher.await.context("Dispatcher task failed")?;
        self.output.shutdown();
        let delivered = self.consumer.await.context("Output task failed")?;

        tracing::info!(
            "Session finished: {} events, {} pipelines, {} results",
            summary.received,
            summary.admitted,
            delivered
        );
        Ok(summary)
    }
}

/// Human readable description of the configuration for the start-up banner
pub fn describe(config: &LintwatchConfig, pipeline: &PipelineSpec, watch_dir: &Path) -> String {
    let mut lines = vec![
        format!("watching: {}", watch_dir.display()),
        format!("files: {}", config.files.join(", ")),
    ];

    for (index, stage) in pipeline.stages().iter().enumerate() {
        let commands = match stage {
            Stage::Sequential(command) => command.to_string(),
            Stage::Parallel(commands) => commands
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
        };
        lines.push(format!("stage {}: {}", index + 1, commands));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, DisplayMode, StageConfig};
    use crate::engine::CommandTemplate;
    use tempfile::TempDir;

    fn config(dir: &Path) -> LintwatchConfig {
        let mut config =
            LintwatchConfig::load_from(None, dir, None, &ConfigOverrides::default()).unwrap();
        config.linters = Some(vec![StageConfig::Single("echo {path}".to_string())]);
        config
    }

    #[test]
    fn test_describe_lists_stages() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path());
        let pipeline = PipelineSpec::new(vec![
            Stage::Sequential(CommandTemplate::parse("flake8 {path}").unwrap()),
            Stage::Parallel(vec![
                CommandTemplate::parse("mypy {path}").unwrap(),
                CommandTemplate::parse("pylint {path}").unwrap(),
            ]),
        ])
        .unwrap();

        let text = describe(&config, &pipeline, Path::new("/src"));
        assert!(text.contains("watching: /src"));
        assert!(text.contains("stage 1: flake8 {path}"));
        assert!(text.contains("stage 2: mypy {path} | pylint {path}"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_session_runs_pipeline_and_drains() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path());
        let pipeline = config.pipeline().unwrap();
        let renderer = Renderer::with_width(DisplayMode::Raw, 80);

        let session = Session::start(pipeline, &config, temp_dir.path(), renderer);
        let intake = session.intake();
        intake.send(temp_dir.path().join("a.py")).unwrap();
        intake.send(temp_dir.path().join("b.py")).unwrap();
        drop(intake);

        let summary = session.finish(false).await.unwrap();
        assert_eq!(summary.admitted, 2);
        assert_eq!(summary.completed, 2);
    }
}
