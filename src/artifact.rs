//! File artifacts and per-task write accounting.
//!
//! Tasks compute [`Artifact`]s (a destination path plus bytes) and hand them
//! to [`write_artifact`], which is the only place the pipeline writes
//! derived files into the working tree. Each task returns a [`TaskReport`]
//! listing what it wrote and what the freshness guard let it skip, which the
//! CLI prints and tests assert on.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A file to be produced: identified by path, not content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Write an artifact, creating parent directories as needed.
pub fn write_artifact(artifact: &Artifact) -> io::Result<()> {
    if let Some(parent) = artifact.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&artifact.path, &artifact.bytes)
}

/// Copy `from` to `to`, creating parent directories as needed.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map(|_| ())
}

/// Outcome of one task run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub written: Vec<PathBuf>,
    /// Outputs left untouched because they were already fresh.
    pub fresh: Vec<PathBuf>,
    /// Inputs the task could not handle and passed over.
    pub skipped: Vec<PathBuf>,
    /// Trees deleted by the task.
    pub removed: Vec<PathBuf>,
}

impl TaskReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }

    pub fn wrote(&mut self, path: impl Into<PathBuf>) {
        self.written.push(path.into());
    }

    pub fn kept_fresh(&mut self, path: impl Into<PathBuf>) {
        self.fresh.push(path.into());
    }

    pub fn skip(&mut self, path: impl Into<PathBuf>) {
        self.skipped.push(path.into());
    }

    pub fn remove(&mut self, path: impl Into<PathBuf>) {
        self.removed.push(path.into());
    }

    /// Fold another report's entries into this one.
    pub fn absorb(&mut self, other: TaskReport) {
        self.written.extend(other.written);
        self.fresh.extend(other.fresh);
        self.skipped.extend(other.skipped);
        self.removed.extend(other.removed);
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.fresh.len()
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let written = self.written.len();
        if !self.removed.is_empty() && self.total() == 0 {
            write!(f, "{} removed", self.removed.len())?;
        } else if !self.fresh.is_empty() {
            write!(
                f,
                "{} written, {} fresh ({} total)",
                written,
                self.fresh.len(),
                self.total()
            )?;
        } else if written == 0 {
            write!(f, "nothing to do")?;
        } else {
            write!(f, "{} written", written)?;
        }
        if !self.skipped.is_empty() {
            write!(f, ", {} skipped", self.skipped.len())?;
        }
        Ok(())
    }
}
