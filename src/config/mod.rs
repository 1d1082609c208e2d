//! Configuration management for lintwatch
//!
//! The configuration is merged from several layers (see [`core`]) and then
//! validated once, before any watching starts. Everything the engine needs is
//! derived from it up front: the immutable [`PipelineSpec`], the
//! [`FileFilter`] for changed paths, and the display mode.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{CommandTemplate, PipelineSpec, Stage};
use crate::shared::glob::FileFilter;

pub mod core;
mod smart_load;

pub use self::core::ConfigOverrides;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintwatchConfig {
    /// How results are displayed
    pub theme: DisplayMode,

    /// Directory watched recursively for changes
    pub watch_dir: PathBuf,

    /// File patterns that select which changes are linted
    pub files: Vec<String>,

    /// Linter pipeline.
    ///
    /// A plain string is a stage of its own and runs after the previous stage
    /// completes. A list of strings is a stage whose commands run concurrently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linters: Option<Vec<StageConfig>>,

    /// Kill a linter after this many seconds (0 = never)
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Closed set of display modes, selected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Plain title line followed by the linter output
    Raw,
    /// Output drawn inside a box
    #[default]
    Frame,
}

/// One pipeline stage as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageConfig {
    Single(String),
    Group(Vec<String>),
}

impl StageConfig {
    fn to_stage(&self) -> Result<Stage> {
        let stage = match self {
            StageConfig::Single(raw) => Stage::Sequential(CommandTemplate::parse(raw)?),
            StageConfig::Group(group) => Stage::Parallel(
                group
                    .iter()
                    .map(|raw| CommandTemplate::parse(raw))
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(stage)
    }
}

impl LintwatchConfig {
    /// Build the immutable pipeline shared by every dispatched task
    pub fn pipeline(&self) -> Result<PipelineSpec> {
        let Some(linters) = self.linters.as_deref() else {
            bail!("No linters specified!");
        };

        let stages = linters
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                stage
                    .to_stage()
                    .with_context(|| format!("Invalid linter stage #{}", index + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        PipelineSpec::new(stages)
    }

    /// Filter deciding which changed paths are linted
    pub fn file_filter(&self) -> Result<FileFilter> {
        FileFilter::new(&self.files)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Check everything the engine relies on. Any error here is fatal.
    pub fn validate(&self) -> Result<()> {
        self.pipeline()?;
        self.file_filter()?;

        if !self.watch_dir.exists() {
            bail!("Watch directory does not exist: {}", self.watch_dir.display());
        }
        if !self.watch_dir.is_dir() {
            bail!("Watch directory is not a directory: {}", self.watch_dir.display());
        }

        Ok(())
    }

    /// Linter programs that cannot be found on `PATH`
    pub fn missing_programs(&self) -> Vec<String> {
        let Ok(pipeline) = self.pipeline() else {
            return Vec::new();
        };

        let mut missing: Vec<String> = Vec::new();
        for command in pipeline.commands() {
            let program = command.name();
            if !missing.iter().any(|seen| seen == program) && which::which(program).is_err() {
                missing.push(program.to_string());
            }
        }
        missing
    }
}
