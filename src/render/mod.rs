//! Terminal rendering of linter results
//!
//! The display mode is chosen once at startup from the configuration. Results
//! only ever reach the renderer through the output channel consumer, which
//! drives it as a [`ResultSink`].

pub mod frame;

use console::Term;
use std::io::Write;

use crate::config::DisplayMode;
use crate::engine::{ResultMessage, ResultSink};

use self::frame::FrameStyle;

/// Shown instead of an empty or "no issues" linter output
pub const NO_ISSUES: &str = "No issues found.";

/// Formats results in the selected display mode and writes them to stdout
#[derive(Debug, Clone)]
pub struct Renderer {
    mode: DisplayMode,
    width: usize,
}

impl Renderer {
    /// Renderer sized to the current terminal
    pub fn new(mode: DisplayMode) -> Self {
        let (_rows, columns) = Term::stdout().size();
        Self::with_width(mode, usize::from(columns))
    }

    pub fn with_width(mode: DisplayMode, width: usize) -> Self {
        Self { mode, width }
    }

    /// Text for one linter result
    pub fn render(&self, message: &ResultMessage) -> String {
        let title = message.title();
        let body = normalize_body(&message.body);

        match self.mode {
            DisplayMode::Raw => format!("{title}\n{body}\n\n"),
            DisplayMode::Frame => {
                let mut framed = frame::draw(FrameStyle::Light, self.width, &title, Some(body));
                framed.push('\n');
                framed
            }
        }
    }

    /// Text for a start-up or shutdown notice
    pub fn banner(&self, title: &str, body: &str) -> String {
        match self.mode {
            DisplayMode::Raw => format!("\n{title}\n{body}\n\n"),
            DisplayMode::Frame => {
                let mut framed = String::from("\n");
                framed.push_str(&frame::draw(FrameStyle::Heavy, self.width, title, Some(body)));
                framed.push('\n');
                framed
            }
        }
    }

    pub fn print_banner(&self, title: &str, body: &str) {
        write_stdout(&self.banner(title, body));
    }
}

impl ResultSink for Renderer {
    fn deliver(&mut self, message: &ResultMessage) {
        write_stdout(&self.render(message));
    }
}

/// Linters that found nothing print nothing or a "no issues found" line
fn normalize_body(body: &str) -> &str {
    if body.trim().is_empty() || body.contains("no issues found") {
        NO_ISSUES
    } else {
        body
    }
}

fn write_stdout(text: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        tracing::debug!("Failed to write to stdout: {}", e);
    }
}
