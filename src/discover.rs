//! Input expansion: explicit files, directories, and shell-style globs.

use crate::error::{Error, Result};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found for a batch, plus the inputs that could not be resolved.
#[derive(Debug, Default)]
pub struct Expansion {
    pub files: Vec<PathBuf>,
    pub failures: Vec<Error>,
}

/// How directory inputs are searched.
#[derive(Debug, Clone)]
pub struct Discovery {
    pattern: Pattern,
    recursive: bool,
}

impl Discovery {
    /// `file_pattern` is matched against file names inside directories.
    pub fn new(file_pattern: &str, recursive: bool) -> Result<Self> {
        let pattern = Pattern::new(file_pattern).map_err(|e| Error::Config {
            path: PathBuf::from("<command line>"),
            message: format!("invalid file pattern {}: {}", file_pattern, e),
        })?;
        Ok(Self { pattern, recursive })
    }

    /// Expand inputs into a sorted, de-duplicated file list.
    ///
    /// Explicit files are taken as given, even when they do not match the
    /// file pattern. An input that does not exist (or a glob with no match)
    /// is recorded as a failure and the rest are still expanded.
    pub fn expand(&self, inputs: &[PathBuf]) -> Expansion {
        let mut expansion = Expansion::default();
        for input in inputs {
            let found = if input.is_file() {
                Ok(vec![input.clone()])
            } else if input.is_dir() {
                self.scan_dir(input)
            } else {
                expand_glob(input)
            };
            match found {
                Ok(files) => expansion.files.extend(files),
                Err(e) => expansion.failures.push(e),
            }
        }
        expansion.files.sort();
        expansion.files.dedup();
        expansion
    }

    fn scan_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        if self.recursive {
            for entry in WalkDir::new(dir).follow_links(true) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        if self.matches(entry.path()) {
                            found.push(entry.into_path());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(dir = %dir.display(), "skipping entry: {}", e),
                }
            }
        } else {
            let entries = fs::read_dir(dir).map_err(|source| Error::Read {
                path: dir.to_path_buf(),
                source,
            })?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && self.matches(&path) {
                    found.push(path);
                }
            }
        }
        tracing::debug!(dir = %dir.display(), files = found.len(), "directory scanned");
        Ok(found)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.pattern.matches(n))
    }
}

fn expand_glob(input: &Path) -> Result<Vec<PathBuf>> {
    let text = input.to_string_lossy();
    if !text.contains(['*', '?', '[']) {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }
    let matches: Vec<PathBuf> = glob::glob(&text)
        .map_err(|_| Error::InputNotFound(input.to_path_buf()))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    if matches.is_empty() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();
        fs::write(dir.path().join("b.h"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.c"), "").unwrap();
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn directory_non_recursive() {
        let dir = tree();
        let files = Discovery::new("*.c", false)
            .unwrap()
            .expand(&[dir.path().to_path_buf()])
            .files;
        assert_eq!(names(&files), vec!["a.c"]);
    }

    #[test]
    fn directory_recursive() {
        let dir = tree();
        let files = Discovery::new("*.c", true)
            .unwrap()
            .expand(&[dir.path().to_path_buf()])
            .files;
        assert_eq!(names(&files), vec!["a.c", "c.c"]);
    }

    #[test]
    fn custom_pattern() {
        let dir = tree();
        let files = Discovery::new("*.[ch]", false)
            .unwrap()
            .expand(&[dir.path().to_path_buf()])
            .files;
        assert_eq!(names(&files), vec!["a.c", "b.h"]);
    }

    #[test]
    fn explicit_file_ignores_pattern_and_dedups() {
        let dir = tree();
        let header = dir.path().join("b.h");
        let files = Discovery::new("*.c", false)
            .unwrap()
            .expand(&[header.clone(), header])
            .files;
        assert_eq!(names(&files), vec!["b.h"]);
    }

    #[test]
    fn glob_input() {
        let dir = tree();
        let pattern = dir.path().join("*.h");
        let files = Discovery::new("*.c", false).unwrap().expand(&[pattern]).files;
        assert_eq!(names(&files), vec!["b.h"]);
    }

    #[test]
    fn missing_input_does_not_hide_others() {
        let dir = tree();
        let missing = dir.path().join("missing.c");
        let expansion = Discovery::new("*.c", false)
            .unwrap()
            .expand(&[missing.clone(), dir.path().join("a.c")]);
        assert_eq!(names(&expansion.files), vec!["a.c"]);
        assert_eq!(expansion.failures.len(), 1);
        assert!(matches!(&expansion.failures[0], Error::InputNotFound(p) if *p == missing));
    }

    #[test]
    fn glob_without_matches_is_missing() {
        let dir = tree();
        let expansion = Discovery::new("*.c", false)
            .unwrap()
            .expand(&[dir.path().join("*.cpp")]);
        assert!(expansion.files.is_empty());
        assert!(matches!(expansion.failures.as_slice(), [Error::InputNotFound(_)]));
    }
}
