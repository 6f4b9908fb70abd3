//! Page task: resolve include directives and write finished HTML.
//!
//! `pages/index.html` becomes `<dest>/index.html` (the working root by
//! default) with every directive replaced by its fragment. See
//! [`crate::include`] for the directive syntax.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::include::{IncludeError, IncludeResolver};
use crate::source_set::{SourceSet, SourceSetError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("{path}: {source}")]
    Include {
        path: PathBuf,
        source: IncludeError,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn run(project: &Project) -> Result<TaskReport, PageError> {
    let config = &project.config.pages;
    let mut report = TaskReport::new("pages");
    let resolver = IncludeResolver::new(project.app_path(&config.components));
    let dest_dir = project.app_path(&config.dest);

    for page in SourceSet::new(&config.sources)?.resolve(&project.app_root)? {
        let Some(file_name) = page.path.file_name() else {
            continue;
        };
        let rendered = resolver
            .render_file(&page.path)
            .map_err(|source| PageError::Include {
                path: page.path.clone(),
                source,
            })?;
        let artifact = Artifact::new(dest_dir.join(file_name), rendered.html);
        write_artifact(&artifact).map_err(|source| PageError::Write {
            path: artifact.path.clone(),
            source,
        })?;
        report.wrote(artifact.path);
    }
    Ok(report)
}
