//! `lintwatch watch`: lint files as they change until Ctrl-C

use anyhow::{Context, Result};
use std::path::Path;

use super::load_validated;
use crate::cli::session::{self, Session};
use crate::cli::{Output, WatchArgs};
use crate::config::ConfigOverrides;
use crate::render::Renderer;
use crate::watch::WatchBridge;

pub async fn execute(args: WatchArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let overrides = ConfigOverrides {
        watch_dir: args.watch_dir,
    };
    let config = load_validated(custom_config, &overrides, output)?;
    let pipeline = config.pipeline()?;
    let filter = config.file_filter()?;

    // Absolute paths keep events valid for linters running inside the watch directory
    let watch_dir = config
        .watch_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve watch directory {}", config.watch_dir.display()))?;

    let renderer = Renderer::new(config.theme);
    if !output.is_quiet() {
        renderer.print_banner("lintwatch started", &session::describe(&config, &pipeline, &watch_dir));
    }

    let session = Session::start(pipeline, &config, &watch_dir, renderer.clone());
    let mut bridge = match WatchBridge::start(&watch_dir, filter, session.intake()) {
        Ok(bridge) => bridge,
        Err(e) => {
            session.finish(true).await?;
            return Err(e);
        }
    };

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    if !output.is_quiet() {
        renderer.print_banner("Bye bye...", "^C pressed.");
    }

    bridge.stop();
    let summary = session.finish(true).await?;
    output.verbose(&format!(
        "{} changes seen, {} linted, {} skipped while busy, {} cancelled",
        summary.received, summary.admitted, summary.dropped, summary.cancelled
    ));
    Ok(())
}
