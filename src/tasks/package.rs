//! Package task: copy the allow-listed artifacts into the output tree.
//!
//! `package.patterns` is resolved against the working tree and every match
//! is copied to the same relative path under `dist_dir`, so
//! `app/css/style.min.css` lands at `dist/css/style.min.css`. Only built
//! artifacts are listed; sources never reach the output tree.

use crate::artifact::{TaskReport, copy_file};
use crate::config::Project;
use crate::source_set::{SourceSet, SourceSetError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("copying {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub fn run(project: &Project) -> Result<TaskReport, PackageError> {
    let mut report = TaskReport::new("package");
    let set = SourceSet::new(&project.config.package.patterns)?;

    for file in set.resolve(&project.app_root)? {
        let dest = project.dist_root.join(&file.relative);
        copy_file(&file.path, &dest).map_err(|source| PackageError::Copy {
            from: file.path.clone(),
            to: dest.clone(),
            source,
        })?;
        report.wrote(dest);
    }
    Ok(report)
}
