//! Process runner
//!
//! Launches one linter as a child process and captures its output without
//! blocking the scheduler. A nonzero exit status is not an error: whatever the
//! linter printed is the result. Only a failure to start the program is turned
//! into a diagnostic message.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::types::{CommandTemplate, ResultMessage};

/// Runs a single command template against a path
///
/// The pipeline executor and the dispatcher are generic over this trait so
/// they can be exercised without spawning real processes.
pub trait CommandRunner: Send + Sync + 'static {
    fn run(
        &self,
        template: &CommandTemplate,
        path: &Path,
    ) -> impl Future<Output = ResultMessage> + Send;
}

/// Runs commands as real child processes via `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory children are started in
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn build_command(&self, program: &str, args: &[String]) -> Command {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        template: &CommandTemplate,
        path: &Path,
    ) -> impl Future<Output = ResultMessage> + Send {
        let name = template.name().to_string();
        let (program, args) = template.expand(path);
        let path = path.to_path_buf();
        let mut command = self.build_command(&program, &args);
        let timeout = self.timeout;

        async move {
            tracing::debug!("Running {} {}", program, args.join(" "));

            let child = match command.spawn() {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!("Failed to start '{}' for {}: {}", program, path.display(), e);
                    let body = format!("failed to start '{program}': {e}");
                    return ResultMessage::new(name, path, body);
                }
            };

            let waiting = child.wait_with_output();
            let finished = match timeout {
                Some(limit) => match tokio::time::timeout(limit, waiting).await {
                    Ok(finished) => finished,
                    Err(_) => {
                        // Dropping the wait future kills the child
                        tracing::warn!(
                            "'{}' timed out after {:?} on {}",
                            program,
                            limit,
                            path.display()
                        );
                        let body = format!("'{program}' timed out after {limit:?}");
                        return ResultMessage::new(name, path, body);
                    }
                },
                None => waiting.await,
            };

            match finished {
                Ok(output) => {
                    tracing::trace!("'{}' exited with {} on {}", program, output.status, path.display());
                    ResultMessage::new(name, path, combine_output(&output.stdout, &output.stderr))
                }
                Err(e) => {
                    tracing::warn!("Lost '{}' while waiting on {}: {}", program, path.display(), e);
                    let body = format!("failed while waiting for '{program}': {e}");
                    ResultMessage::new(name, path, body)
                }
            }
        }
    }
}

/// Trimmed stdout, followed by trimmed stderr when there is any
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    match (stdout.trim(), stderr.trim()) {
        (out, "") => out.to_string(),
        ("", err) => err.to_string(),
        (out, err) => format!("{out}\n\n{err}"),
    }
}
