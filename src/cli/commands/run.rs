//! `lintwatch run`: lint the given files once and exit

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::load_validated;
use crate::cli::session::Session;
use crate::cli::{Output, RunArgs};
use crate::config::ConfigOverrides;
use crate::render::Renderer;

pub async fn execute(args: RunArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = load_validated(custom_config, &ConfigOverrides::default(), output)?;
    let pipeline = config.pipeline()?;
    let filter = config.file_filter()?;

    let files = args
        .files
        .iter()
        .map(|file| {
            file.canonicalize()
                .with_context(|| format!("File not found: {}", file.display()))
        })
        .collect::<Result<Vec<PathBuf>>>()?;

    let work_dir = config
        .watch_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve watch directory {}", config.watch_dir.display()))?;

    let session = Session::start(pipeline, &config, &work_dir, Renderer::new(config.theme));
    let intake = session.intake();
    for file in files {
        if !filter.is_match(&file) {
            output.verbose(&format!("{} does not match the configured file patterns", file.display()));
        }
        intake.send(file).context("Dispatcher stopped before all files were queued")?;
    }
    drop(intake);

    let summary = session.finish(false).await?;
    output.verbose(&format!(
        "{} files linted, {} skipped while already running, {} pipelines failed",
        summary.admitted, summary.dropped, summary.failed
    ));
    Ok(())
}
