//! Test doubles for the engine

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::runner::CommandRunner;
use super::types::{CommandTemplate, PipelineSpec, ResultMessage, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    Started(String),
    Finished(String),
}

/// Runner that sleeps instead of spawning and records what it was asked to do
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    delays: HashMap<String, Duration>,
    panics: HashSet<String>,
    trace: Mutex<Vec<Trace>>,
    active: Mutex<HashMap<PathBuf, usize>>,
    peak: Mutex<HashMap<PathBuf, usize>>,
    runs: Mutex<Vec<PathBuf>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, command: &str, delay: Duration) -> Self {
        self.delays.insert(command.to_string(), delay);
        self
    }

    pub fn panics(mut self, command: &str) -> Self {
        self.panics.insert(command.to_string());
        self
    }

    pub fn trace(&self) -> Vec<Trace> {
        self.trace.lock().unwrap().clone()
    }

    /// Paths of every command run, in start order
    pub fn runs(&self) -> Vec<PathBuf> {
        self.runs.lock().unwrap().clone()
    }

    /// Highest number of commands seen running at once for `path`
    pub fn peak_concurrency(&self, path: &Path) -> usize {
        self.peak.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    fn enter(&self, name: &str, path: &Path) {
        self.trace.lock().unwrap().push(Trace::Started(name.to_string()));
        self.runs.lock().unwrap().push(path.to_path_buf());

        let mut active = self.active.lock().unwrap();
        let count = active.entry(path.to_path_buf()).or_default();
        *count += 1;
        let mut peak = self.peak.lock().unwrap();
        let highest = peak.entry(path.to_path_buf()).or_default();
        *highest = (*highest).max(*count);
    }

    fn leave(&self, name: &str, path: &Path) {
        if let Some(count) = self.active.lock().unwrap().get_mut(path) {
            *count -= 1;
        }
        self.trace.lock().unwrap().push(Trace::Finished(name.to_string()));
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        template: &CommandTemplate,
        path: &Path,
    ) -> impl Future<Output = ResultMessage> + Send {
        let name = template.name().to_string();
        let path = path.to_path_buf();

        async move {
            self.enter(&name, &path);
            if let Some(delay) = self.delays.get(&name) {
                tokio::time::sleep(*delay).await;
            }
            self.leave(&name, &path);

            if self.panics.contains(&name) {
                panic!("scripted panic in {name}");
            }
            let body = format!("{name} ok");
            ResultMessage::new(name, path, body)
        }
    }
}

/// Build a pipeline from command names: one name is a sequential stage,
/// several names form a parallel stage.
pub fn spec(stages: &[&[&str]]) -> PipelineSpec {
    let template = |name: &&str| CommandTemplate::parse(&format!("{name} {{path}}")).unwrap();
    let stages = stages
        .iter()
        .map(|names| match names {
            [single] => Stage::Sequential(template(single)),
            many => Stage::Parallel(many.iter().map(template).collect()),
        })
        .collect();
    PipelineSpec::new(stages).unwrap()
}
