//! Font task: TrueType/OpenType to WOFF2.
//!
//! Each source becomes `<dest>/<stem>.woff2`. There is no freshness check;
//! every run reconverts every font.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::source_set::{SourceSet, SourceSetError};
use crate::woff2::{self, Woff2Error};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FontError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Encode { path: PathBuf, source: Woff2Error },
}

pub fn run(project: &Project) -> Result<TaskReport, FontError> {
    let config = &project.config.fonts;
    let mut report = TaskReport::new("fonts");
    let dest_dir = project.app_path(&config.dest);

    for source in SourceSet::new(&config.sources)?.resolve(&project.app_root)? {
        let Some(stem) = source.path.file_stem() else {
            report.skip(&source.path);
            continue;
        };
        let data = std::fs::read(&source.path).map_err(|e| FontError::Io {
            path: source.path.clone(),
            source: e,
        })?;
        let encoded = woff2::encode(&data).map_err(|e| FontError::Encode {
            path: source.path.clone(),
            source: e,
        })?;
        debug!(
            "{}: {} -> {} bytes",
            source.relative,
            data.len(),
            encoded.len()
        );

        let artifact = Artifact::new(
            dest_dir.join(format!("{}.woff2", stem.to_string_lossy())),
            encoded,
        );
        write_artifact(&artifact).map_err(|e| FontError::Io {
            path: artifact.path.clone(),
            source: e,
        })?;
        report.wrote(artifact.path);
    }
    Ok(report)
}
