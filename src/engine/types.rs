//! Core data types shared by the engine: command templates, pipeline stages
//! and the result messages that flow to the renderer.

use anyhow::{Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder substituted with the changed file's path
pub const PATH_PLACEHOLDER: &str = "{path}";

/// A linter command line with a `{path}` placeholder, parsed once at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Parse a template such as `"mypy --strict {path}"`
    pub fn parse(raw: &str) -> Result<Self> {
        let tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

        if tokens.is_empty() {
            bail!("Linter command is empty");
        }
        if !tokens.iter().any(|token| token.contains(PATH_PLACEHOLDER)) {
            bail!("Linter command '{raw}' must contain the {PATH_PLACEHOLDER} placeholder");
        }

        Ok(Self {
            raw: raw.trim().to_string(),
            tokens,
        })
    }

    /// Logical name of the command: the first whitespace-delimited token
    pub fn name(&self) -> &str {
        &self.tokens[0]
    }

    /// The template as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Expand the placeholder, returning the program and its arguments.
    ///
    /// Substitution happens per token, so a path containing spaces stays a
    /// single argument.
    pub fn expand(&self, path: &Path) -> (String, Vec<String>) {
        let path = path.to_string_lossy();
        let mut expanded = self
            .tokens
            .iter()
            .map(|token| token.replace(PATH_PLACEHOLDER, &path));

        // parse() guarantees at least one token
        let program = expanded.next().unwrap_or_default();
        (program, expanded.collect())
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One step of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A single command, awaited before the next stage starts
    Sequential(CommandTemplate),
    /// A batch of commands run concurrently; the stage ends when all finish
    Parallel(Vec<CommandTemplate>),
}

impl Stage {
    pub fn commands(&self) -> &[CommandTemplate] {
        match self {
            Stage::Sequential(command) => std::slice::from_ref(command),
            Stage::Parallel(commands) => commands,
        }
    }
}

/// Ordered, immutable list of stages shared read-only by every pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    stages: Vec<Stage>,
}

impl PipelineSpec {
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            bail!("No linters specified!");
        }
        if stages
            .iter()
            .any(|stage| matches!(stage, Stage::Parallel(commands) if commands.is_empty()))
        {
            bail!("A parallel linter group must contain at least one command");
        }
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Every command of every stage, in declaration order
    pub fn commands(&self) -> impl Iterator<Item = &CommandTemplate> {
        self.stages.iter().flat_map(Stage::commands)
    }
}

/// Output of one command execution, routed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMessage {
    /// Program name of the command that produced the output
    pub command: String,
    /// File the command was run against
    pub path: PathBuf,
    /// Captured output text, trimmed
    pub body: String,
}

impl ResultMessage {
    pub fn new(command: impl Into<String>, path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            path: path.into(),
            body: body.into(),
        }
    }

    /// Title line used by the renderers
    pub fn title(&self) -> String {
        format!("{}: {}", self.command, self.path.display())
    }
}
