//! docslayer: generate documentation for AUTOSAR C source files.
//!
//! Scans C files for Runnables (`FUNC(...)` definitions), static and global
//! functions, macros and file-scope variables, and writes one report per
//! source file and format:
//!
//! - `docslayer app.c` prints Markdown to stdout
//! - `docslayer -r -o docs -f markdown,json src/` writes `docs/<stem>.md` and `docs/<stem>.json`

mod cancel;
mod config;
mod discover;
mod error;
mod model;
mod parser;
mod render;
mod toc;
mod worker;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use config::{Format, Overrides, Settings};
use std::collections::HashSet;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docslayer",
    version,
    about = "Generate documentation for AUTOSAR C sources: runnables, macros and global variables"
)]
struct Cli {
    /// Input files or directories (globs supported)
    inputs: Vec<PathBuf>,

    /// Additional input file or directory; may be repeated
    #[arg(long = "input", value_name = "PATH")]
    extra_inputs: Vec<PathBuf>,

    /// Output directory. Without it, reports go to stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output formats, comma separated: markdown (default), json, excel, word
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// What to extract, comma separated: functions, macros, variables, all (default)
    #[arg(short = 'p', long)]
    parse: Option<String>,

    /// JSON batch configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Descend into subdirectories of directory inputs
    #[arg(short = 'r', long)]
    recursive: bool,

    /// File name pattern for directory inputs [default: *.c]
    #[arg(long, value_name = "GLOB")]
    file_pattern: Option<String>,

    /// Run without a GUI (the only mode; accepted for compatibility)
    #[arg(long)]
    no_gui: bool,

    /// Debug logging (overridden by DOCSLAYER_LOG)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if cli.no_gui {
        tracing::debug!("--no-gui given; running headless");
    }

    let mut inputs = cli.inputs;
    inputs.extend(cli.extra_inputs);
    let settings = Settings::resolve(
        cli.config.as_deref(),
        Overrides {
            inputs,
            output: cli.output,
            format: cli.format,
            parse: cli.parse,
            file_pattern: cli.file_pattern,
            recursive: cli.recursive,
        },
    )?;

    if run(&settings)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("DOCSLAYER_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Scan every input and export every format. Returns `false` when any input,
/// file or format failed; failures never stop the rest of the batch. A
/// closed stdout cancels the remaining scans.
fn run(settings: &Settings) -> Result<bool> {
    if settings.inputs.is_empty() {
        bail!("no inputs given; pass files or directories, or a --config with \"inputs\"");
    }

    let discovery = discover::Discovery::new(&settings.file_pattern, settings.recursive)?;
    let expansion = discovery.expand(&settings.inputs);
    let mut ok = expansion.failures.is_empty();
    for e in &expansion.failures {
        tracing::error!("{}", e);
    }
    let files = expansion.files;
    if files.is_empty() {
        if !ok {
            return Ok(false);
        }
        bail!("no files matching {} found", settings.file_pattern);
    }

    if let Some(dir) = &settings.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }

    let token = cancel::CancellationToken::new();
    let mut used_names = HashSet::new();

    for path in &files {
        let doc = match scan_one(path, settings, &token) {
            Ok(doc) => doc,
            Err(e) if e.is_cancelled() => {
                tracing::debug!("{}: scan cancelled, stopping", path.display());
                break;
            }
            Err(e) => {
                tracing::error!("{}", e);
                ok = false;
                continue;
            }
        };

        if doc.is_empty() {
            tracing::info!("{}: nothing found", path.display());
        }

        let name = unique_name(derive_output_name(path), &mut used_names);
        for &format in &settings.formats {
            match export(&doc, &name, format, settings) {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    // stdout closed
                    token.cancel();
                    break;
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    ok = false;
                }
            }
        }
    }

    Ok(ok)
}

/// Scan one file on a worker thread, logging its progress.
fn scan_one(
    path: &Path,
    settings: &Settings,
    token: &cancel::CancellationToken,
) -> error::Result<model::Document> {
    let job = worker::ScanJob::spawn_with_token(path.to_path_buf(), settings.targets, token.clone())?;
    for event in job.events() {
        match event {
            worker::Progress::Started(p) => tracing::info!("scanning {}", p.display()),
            worker::Progress::Phase(phase) => {
                tracing::debug!(file = %job.path().display(), "scanning {}", phase)
            }
        }
    }
    job.join()
}

/// Write one format for one document, to the output directory or stdout.
/// A closed stdout reports `Cancelled`.
fn export(
    doc: &model::Document,
    name: &str,
    format: Format,
    settings: &Settings,
) -> error::Result<()> {
    let target = match &settings.output {
        Some(dir) => dir.join(name),
        None => PathBuf::from("<stdout>"),
    };
    let fail = |path: &Path, e: anyhow::Error| error::Error::Export {
        format: format.to_string(),
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    };

    let renderer = render::create_renderer(format, &settings.fields).map_err(|e| fail(&target, e))?;
    let text = renderer.render(doc).map_err(|e| fail(&target, e))?;

    match &settings.output {
        Some(dir) => {
            let out_path = dir.join(format!("{}.{}", name, renderer.file_extension()));
            fs::write(&out_path, text).map_err(|e| fail(&out_path, e.into()))?;
            tracing::info!("wrote {}", out_path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                if e.kind() == io::ErrorKind::BrokenPipe {
                    return Err(error::Error::Cancelled);
                }
                return Err(fail(&target, e.into()));
            }
        }
    }
    Ok(())
}

/// Derive the output file name (without extension) from a source path.
/// "src/app.c" → "app"
fn derive_output_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Two inputs with the same stem (e.g. `app.c` and `app.h`, or files from
/// different directories) get `-2`, `-3`, ... suffixes in batch order.
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", name, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
