//! Batch configuration: an optional JSON file merged with command-line flags.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Field labels for function tables, in output order.
pub const FUNCTION_FIELDS: &[&str] = &[
    "Name",
    "Syntax",
    "Return Value",
    "In-Parameters",
    "Out-Parameters",
    "Function Type",
    "Description",
    "Sync/Async",
    "Reentrancy",
    "Triggers",
    "Inputs",
    "Outputs",
    "Invoked Operations",
    "Used Data Types",
    "Line",
];

pub const MACRO_FIELDS: &[&str] = &["Name", "Parameters", "Value", "Line"];

pub const VARIABLE_FIELDS: &[&str] = &["Name", "Data Type", "Initial Value", "Scope", "Line"];

pub const DEFAULT_FILE_PATTERN: &str = "*.c";

/// Output formats the tool knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Excel,
    Word,
    Markdown,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" => Ok(Format::Excel),
            "word" => Ok(Format::Word),
            "markdown" | "md" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            other => Err(format!(
                "unknown format: {}. Use excel, word, markdown, or json",
                other
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Excel => "excel",
            Format::Word => "word",
            Format::Markdown => "markdown",
            Format::Json => "json",
        };
        f.write_str(s)
    }
}

/// Which scanners to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTargets {
    pub functions: bool,
    pub macros: bool,
    pub variables: bool,
}

impl ParseTargets {
    pub const ALL: ParseTargets = ParseTargets {
        functions: true,
        macros: true,
        variables: true,
    };

    const NONE: ParseTargets = ParseTargets {
        functions: false,
        macros: false,
        variables: false,
    };

    /// Build from names like `functions`, `macros`, `variables`, `all`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, String> {
        let mut targets = ParseTargets::NONE;
        for name in names {
            match name.as_ref().trim().to_ascii_lowercase().as_str() {
                "all" => targets = ParseTargets::ALL,
                "functions" => targets.functions = true,
                "macros" => targets.macros = true,
                "variables" => targets.variables = true,
                "" => {}
                other => {
                    return Err(format!(
                        "unknown parse target: {}. Use functions, macros, variables, or all",
                        other
                    ))
                }
            }
        }
        if targets == ParseTargets::NONE {
            return Err("no parse target selected".to_string());
        }
        Ok(targets)
    }
}

impl Default for ParseTargets {
    fn default() -> Self {
        ParseTargets::ALL
    }
}

/// Selected table rows per entity kind, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub functions: Vec<&'static str>,
    pub macros: Vec<&'static str>,
    pub variables: Vec<&'static str>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            functions: FUNCTION_FIELDS.to_vec(),
            macros: MACRO_FIELDS.to_vec(),
            variables: VARIABLE_FIELDS.to_vec(),
        }
    }
}

/// A string or a list of strings in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_items(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => split_list(&s),
            OneOrMany::Many(v) => v,
        }
    }
}

/// On-disk shape of a batch config.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<OneOrMany>,
    pub parse: Option<OneOrMany>,
    pub file_pattern: Option<String>,
    pub recursive: Option<bool>,
    pub function_fields: Option<Vec<String>>,
    pub macro_fields: Option<Vec<String>>,
    pub variable_fields: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Values given on the command line; `None`/`false` means "not set".
#[derive(Debug, Default)]
pub struct Overrides {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub parse: Option<String>,
    pub file_pattern: Option<String>,
    pub recursive: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub formats: Vec<Format>,
    pub targets: ParseTargets,
    pub file_pattern: String,
    pub recursive: bool,
    pub fields: FieldSelection,
}

impl Settings {
    /// Merge an optional config file with command-line overrides.
    ///
    /// Flags win over config values; command-line inputs are appended to the
    /// config's inputs.
    pub fn resolve(config_path: Option<&Path>, cli: Overrides) -> Result<Self> {
        let (config, origin) = match config_path {
            Some(path) => (ConfigFile::load(path)?, path.to_path_buf()),
            None => (ConfigFile::default(), PathBuf::from("<command line>")),
        };
        let invalid = |message: String| Error::Config {
            path: origin.clone(),
            message,
        };

        let mut inputs = config.inputs;
        inputs.extend(cli.inputs);

        let format_items = match cli.format {
            Some(list) => split_list(&list),
            None => config
                .format
                .map(OneOrMany::into_items)
                .unwrap_or_else(|| vec!["markdown".to_string()]),
        };
        let formats = parse_formats(&format_items).map_err(invalid)?;

        let parse_items = match cli.parse {
            Some(list) => split_list(&list),
            None => config
                .parse
                .map(OneOrMany::into_items)
                .unwrap_or_else(|| vec!["all".to_string()]),
        };
        let targets = ParseTargets::from_names(&parse_items).map_err(invalid)?;

        let file_pattern = cli
            .file_pattern
            .or(config.file_pattern)
            .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string());
        glob::Pattern::new(&file_pattern)
            .map_err(|e| invalid(format!("invalid file pattern {}: {}", file_pattern, e)))?;

        let fields = FieldSelection {
            functions: select_fields(config.function_fields, FUNCTION_FIELDS, "function")
                .map_err(invalid)?,
            macros: select_fields(config.macro_fields, MACRO_FIELDS, "macro").map_err(invalid)?,
            variables: select_fields(config.variable_fields, VARIABLE_FIELDS, "variable")
                .map_err(invalid)?,
        };

        Ok(Settings {
            inputs,
            output: cli.output.or(config.output),
            formats,
            targets,
            file_pattern,
            recursive: cli.recursive || config.recursive.unwrap_or(false),
            fields,
        })
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse format names, keeping first occurrence order.
fn parse_formats(items: &[String]) -> std::result::Result<Vec<Format>, String> {
    let mut formats = Vec::new();
    for item in items {
        let format: Format = item.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err("no output format selected".to_string());
    }
    Ok(formats)
}

/// Resolve requested labels against `known`; absent means all of them.
fn select_fields(
    requested: Option<Vec<String>>,
    known: &'static [&'static str],
    kind: &str,
) -> std::result::Result<Vec<&'static str>, String> {
    let Some(requested) = requested else {
        return Ok(known.to_vec());
    };
    if let Some(unknown) = requested.iter().find(|r| !known.contains(&r.as_str())) {
        return Err(format!("unknown {} field: {}", kind, unknown));
    }
    Ok(known
        .iter()
        .copied()
        .filter(|k| requested.iter().any(|r| r == k))
        .collect())
}
