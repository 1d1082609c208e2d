//! Watch bridge
//!
//! Hands file-change notifications from the `notify` watcher thread to the
//! dispatcher. The watcher callback runs off the tokio runtime; the only thing
//! it does with shared state is one thread-safe `send` into the intake channel
//! per relevant path.

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

use crate::engine::IntakeSender;
use crate::shared::glob::FileFilter;

/// Running filesystem watcher feeding the intake channel
pub struct WatchBridge {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
}

impl WatchBridge {
    /// Watch `root` recursively, forwarding changed files accepted by `filter`
    pub fn start(root: &Path, filter: FileFilter, intake: IntakeSender) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                forward(&event, &filter, &intake);
            }
            Err(e) => tracing::warn!("File watcher error: {}", e),
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        tracing::info!("Watching {}", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            watcher: Some(watcher),
        })
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop delivering events. Dropping the watcher also drops its intake
    /// sender, which closes the channel once no other senders remain.
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::info!("Stopped watching {}", self.root.display());
        }
    }
}

impl Drop for WatchBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Content or metadata modifications. Creations, renames and access events
/// are ignored.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other | ModifyKind::Metadata(_))
    )
}

/// Enqueue the relevant paths of one event. Returns how many were sent.
fn forward(event: &Event, filter: &FileFilter, intake: &IntakeSender) -> usize {
    if !is_content_change(&event.kind) {
        return 0;
    }

    let mut sent = 0;
    for path in event.paths.iter().filter(|path| !path.is_dir() && filter.is_match(path)) {
        match intake.send(path.clone()) {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!("Dispatcher is not running, dropping change to {}", e.0.display()),
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::intake_channel;
    use notify::event::{AccessKind, CreateKind, DataChange, RenameMode};
    use std::time::Duration;
    use tempfile::TempDir;

    fn py_filter() -> FileFilter {
        FileFilter::new(&["*.py".to_string()]).unwrap()
    }

    fn modify(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_forwards_matching_modifications() {
        let (tx, mut rx) = intake_channel();

        assert_eq!(forward(&modify("/src/app.py"), &py_filter(), &tx), 1);
        assert_eq!(rx.try_recv().unwrap(), PathBuf::from("/src/app.py"));
    }

    #[test]
    fn test_ignores_other_files_and_event_kinds() {
        let (tx, mut rx) = intake_channel();
        let filter = py_filter();

        assert_eq!(forward(&modify("/src/README.md"), &filter, &tx), 0);

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/src/new.py"));
        assert_eq!(forward(&created, &filter, &tx), 0);

        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/src/old.py"))
            .add_path(PathBuf::from("/src/new.py"));
        assert_eq!(forward(&renamed, &filter, &tx), 0);

        let accessed = Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/src/app.py"));
        assert_eq!(forward(&accessed, &filter, &tx), 0);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_intake_does_not_panic() {
        let (tx, rx) = intake_channel();
        drop(rx);
        assert_eq!(forward(&modify("/src/app.py"), &py_filter(), &tx), 0);
    }

    #[tokio::test]
    async fn test_watcher_delivers_changes() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("watched.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let (tx, mut rx) = intake_channel();
        let mut bridge = WatchBridge::start(temp_dir.path(), py_filter(), tx).unwrap();
        assert!(bridge.is_running());

        // Give the OS watch a moment to register
        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(&file, "x = 2\n").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("change delivered")
            .expect("channel open");
        assert_eq!(changed.file_name(), file.file_name());

        bridge.stop();
        assert!(!bridge.is_running());
    }
}
