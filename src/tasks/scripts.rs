//! Script task: concatenate entries in listed order, then minify.
//!
//! No module resolution happens here. Whoever lists the entries decides the
//! order, and a symbol defined by an earlier entry is visible to the
//! top-level code of a later one.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::source_set::{SourceFile, SourceSet, SourceSetError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Concatenate `sources` with newlines and minify the bundle.
pub fn bundle(sources: &[SourceFile]) -> Result<String, ScriptError> {
    let parts = sources
        .iter()
        .map(|s| {
            std::fs::read_to_string(&s.path).map_err(|source| ScriptError::Read {
                path: s.path.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let joined = parts.join("\n");
    Ok(minifier::js::minify(&joined).to_string())
}

pub fn run(project: &Project) -> Result<TaskReport, ScriptError> {
    let config = &project.config.scripts;
    let mut report = TaskReport::new("scripts");

    let sources = SourceSet::new(&config.entries)?.resolve(&project.app_root)?;
    if sources.is_empty() {
        warn!("scripts: no entry matched {:?}", config.entries);
        return Ok(report);
    }

    let artifact = Artifact::new(project.app_path(&config.output), bundle(&sources)?);
    write_artifact(&artifact).map_err(|source| ScriptError::Write {
        path: artifact.path.clone(),
        source,
    })?;
    report.wrote(artifact.path);
    Ok(report)
}
