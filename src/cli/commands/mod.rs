//! Command implementations for the lintwatch CLI
//!
//! Each command is organized into its own module.

pub mod config;
pub mod run;
pub mod watch;

use anyhow::Result;
use std::path::Path;

use crate::cli::Output;
use crate::config::{ConfigOverrides, LintwatchConfig};

/// Load and validate the configuration. Invalid configurations never start a session.
fn load_validated(custom_config: Option<&Path>, overrides: &ConfigOverrides, output: &Output) -> Result<LintwatchConfig> {
    let config = LintwatchConfig::load(custom_config, overrides)?;
    config.validate()?;

    for program in config.missing_programs() {
        output.warning(&format!("'{program}' was not found on PATH; its results will report the failure"));
    }
    Ok(config)
}
