//! Configuration command implementations

use anyhow::Result;
use std::path::Path;

use crate::cli::{ConfigCommands, Output};
use crate::config::{ConfigOverrides, LintwatchConfig};
use crate::engine::Stage;

/// Execute config commands
pub async fn execute(cmd: ConfigCommands, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => show(custom_config, &format),
        ConfigCommands::Validate => validate(custom_config, output),
    }
}

fn show(custom_config: Option<&Path>, format: &str) -> Result<()> {
    let config = LintwatchConfig::load(custom_config, &ConfigOverrides::default())?;
    print!("{}", config.to_format(format)?);
    Ok(())
}

fn validate(custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = LintwatchConfig::load(custom_config, &ConfigOverrides::default())?;
    config.validate()?;
    let pipeline = config.pipeline()?;

    output.success("Configuration is valid");

    output.header("Settings");
    output.key_value("theme", &format!("{:?}", config.theme).to_lowercase());
    output.key_value("watch_dir", &config.watch_dir.display().to_string());
    output.key_value("files", &config.files.join(", "));
    output.key_value("timeout", &match config.timeout() {
        Some(timeout) => format!("{}s", timeout.as_secs()),
        None => "none".to_string(),
    });

    output.header("Pipeline");
    for (index, stage) in pipeline.stages().iter().enumerate() {
        let kind = match stage {
            Stage::Sequential(_) => "sequential",
            Stage::Parallel(_) => "parallel",
        };
        output.info(&format!("Stage {} ({kind})", index + 1));
        for command in stage.commands() {
            output.list_item(command.as_str());
        }
    }

    let missing = config.missing_programs();
    if !missing.is_empty() {
        println!();
        for program in missing {
            output.warning(&format!("'{program}' was not found on PATH"));
        }
    }
    Ok(())
}
