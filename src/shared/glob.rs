//! Glob pattern utilities
//!
//! Decides which changed files are relevant to the configured linters.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Create a GlobSet from a list of patterns for efficient batch matching
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid file pattern '{pattern}'"))?;
        builder.add(glob);
    }

    Ok(builder.build()?)
}

/// Matches changed paths against the configured file patterns
///
/// Patterns are tried against the full path and against the file name alone,
/// so `*.py` matches `/src/pkg/mod.py` and `tests/*.py` matches files below a
/// `tests` directory.
#[derive(Debug, Clone)]
pub struct FileFilter {
    globs: GlobSet,
}

impl FileFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            globs: build_globset(patterns)?,
        })
    }

    /// An empty pattern list matches nothing
    pub fn is_match(&self, path: &Path) -> bool {
        self.globs.is_match(path)
            || path
                .file_name()
                .is_some_and(|name| self.globs.is_match(Path::new(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> FileFilter {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        FileFilter::new(&patterns).unwrap()
    }

    #[test]
    fn test_extension_pattern_matches_nested_paths() {
        let filter = filter(&["*.py"]);
        assert!(filter.is_match(Path::new("/home/dev/project/pkg/module.py")));
        assert!(filter.is_match(Path::new("module.py")));
        assert!(!filter.is_match(Path::new("/home/dev/project/README.md")));
    }

    #[test]
    fn test_multiple_patterns() {
        let filter = filter(&["*.py", "**/*.pyi"]);
        assert!(filter.is_match(Path::new("src/stubs/types.pyi")));
        assert!(filter.is_match(Path::new("src/app.py")));
        assert!(!filter.is_match(Path::new("src/app.rs")));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = filter(&[]);
        assert!(!filter.is_match(Path::new("/proj/.git/index")));
        assert!(!filter.is_match(Path::new("/proj/target/debug/x.o")));
        assert!(!filter.is_match(Path::new("anything.py")));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let patterns = vec!["src/[".to_string()];
        let error = FileFilter::new(&patterns).unwrap_err();
        assert!(error.to_string().contains("src/["));
    }
}
