//! Background scan of one file with progress reporting and cancellation.

use crate::cancel::CancellationToken;
use crate::config::ParseTargets;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::{self, Phase};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Progress events sent by a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Started(PathBuf),
    Phase(Phase),
}

/// A scan running on its own thread.
///
/// The job owns the receiving end of its progress channel; the channel
/// closes when the worker thread finishes. Cancel through the token the job
/// was started with; it takes effect at the next phase boundary.
pub struct ScanJob {
    path: PathBuf,
    events: Receiver<Progress>,
    handle: JoinHandle<Result<Document>>,
}

impl ScanJob {
    /// Start scanning `path`, stopping early once `token` is cancelled.
    pub fn spawn_with_token(
        path: PathBuf,
        targets: ParseTargets,
        token: CancellationToken,
    ) -> Result<Self> {
        Self::spawn_task(path, token, move |path, token, tx| {
            parser::parse_file(path, targets, token, |phase| {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(Progress::Phase(phase));
            })
        })
    }

    fn spawn_task<F>(path: PathBuf, token: CancellationToken, task: F) -> Result<Self>
    where
        F: FnOnce(&Path, &CancellationToken, &Sender<Progress>) -> Result<Document> + Send + 'static,
    {
        let (tx, events) = mpsc::channel();
        let worker_path = path.clone();
        let handle = thread::Builder::new()
            .name("docslayer-scan".to_string())
            .spawn(move || {
                let _ = tx.send(Progress::Started(worker_path.clone()));
                task(&worker_path, &token, &tx)
            })
            .map_err(|e| Error::Parse {
                path: path.clone(),
                message: format!("failed to start worker: {}", e),
            })?;

        Ok(Self {
            path,
            events,
            handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block on progress events until the worker finishes.
    pub fn events(&self) -> impl Iterator<Item = Progress> + '_ {
        self.events.iter()
    }

    /// Wait for the result. A panicking worker is reported as a parse error.
    pub fn join(self) -> Result<Document> {
        let path = self.path;
        self.handle.join().unwrap_or_else(|panic| {
            Err(Error::Parse {
                path,
                message: format!("worker panicked: {}", panic_message(&*panic)),
            })
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
