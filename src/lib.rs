//! # lintwatch - run your linters on every file you save
//!
//! lintwatch watches a source tree and, whenever a matching file changes,
//! runs a configured pipeline of linters against it and prints the results.
//!
//! ## Features
//!
//! - **Staged pipelines**: stages run in order, commands inside a stage run concurrently
//! - **One run per file**: a change to a file that is already being linted is dropped
//! - **Independent failures**: a crashing or missing linter never stops the others
//! - **Layered configuration**: TOML, JSON or YAML files, environment variables and flags
//!
//! ## Quick Start
//!
//! ```bash
//! cat > .lintwatch.toml <<'EOF'
//! files = ["*.py"]
//! linters = ["flake8 {path}", ["mypy {path}", "pylint {path}"]]
//! EOF
//!
//! lintwatch            # watch the current directory
//! lintwatch run a.py   # lint once and exit
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod render;
pub mod shared;
pub mod watch;

pub use cli::{Cli, Output};
pub use config::LintwatchConfig;

/// Result type alias for lintwatch operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
