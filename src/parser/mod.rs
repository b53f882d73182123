//! Parser module: the scan pipeline over one C source file.

pub mod balance;
pub mod classify;
pub mod comments;
pub mod doxygen;
pub mod macros;
pub mod signature;
pub mod variables;

use crate::cancel::CancellationToken;
use crate::config::ParseTargets;
use crate::error::{Error, Result};
use crate::model::{Category, Document};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Extensions dispatched to the C scanners.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["c", "h"];

/// A unit of work between two cancellation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Runnables,
    StaticFunctions,
    GlobalFunctions,
    Macros,
    Variables,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Runnables => "runnables",
            Phase::StaticFunctions => "static functions",
            Phase::GlobalFunctions => "global functions",
            Phase::Macros => "macros",
            Phase::Variables => "variables",
        };
        f.write_str(s)
    }
}

/// Whether `path` has an extension the scanners understand.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Read a source file as UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and scan a file, dispatching by extension.
pub fn parse_file(
    path: &Path,
    targets: ParseTargets,
    token: &CancellationToken,
    on_phase: impl FnMut(Phase),
) -> Result<Document> {
    if !is_supported(path) {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: "unsupported file type".to_string(),
        });
    }
    let src = read_source(path)?;
    scan(path, &src, targets, token, on_phase)
}

/// Run the selected scanners over `src`.
///
/// The token is checked before every phase; `on_phase` is called as each
/// phase starts. Function definitions found by more than one category scan
/// are kept once, under the first category (Runnable, Static, Global).
pub fn scan(
    path: &Path,
    src: &str,
    targets: ParseTargets,
    token: &CancellationToken,
    mut on_phase: impl FnMut(Phase),
) -> Result<Document> {
    let mut doc = Document {
        source_file: path.to_string_lossy().to_string(),
        ..Document::default()
    };

    if targets.functions {
        let prepared = signature::Prepared::new(src);
        let mut seen = HashSet::new();
        for (phase, category) in [
            (Phase::Runnables, Category::Runnable),
            (Phase::StaticFunctions, Category::Static),
            (Phase::GlobalFunctions, Category::Global),
        ] {
            token.check()?;
            on_phase(phase);
            let found = signature::scan(&prepared, category).map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            for f in found {
                if seen.insert(f.paren) {
                    doc.functions.push(f.record);
                } else {
                    tracing::debug!(function = %f.record.name, %category, "duplicate match dropped");
                }
            }
        }
    }

    if targets.macros {
        token.check()?;
        on_phase(Phase::Macros);
        doc.macros = macros::parse(src);
    }

    if targets.variables {
        token.check()?;
        on_phase(Phase::Variables);
        doc.variables = variables::parse(src);
    }

    tracing::debug!(
        file = %path.display(),
        functions = doc.functions.len(),
        macros = doc.macros.len(),
        variables = doc.variables.len(),
        "scan finished"
    );
    Ok(doc)
}
