//! Image task: next-gen siblings plus a re-compressed copy of every source.
//!
//! For each source file two passes run, one after the other:
//!
//! 1. **Conversion.** Decodable rasters get a `.webp` sibling (and an
//!    `.avif` one when enabled) in the destination directory. SVGs are not
//!    converted; other undecodable files are skipped with a warning.
//! 2. **Compression.** Every source, SVGs included, is re-compressed into the
//!    destination directory under its own file name.
//!
//! Each derived output is checked against its source with the freshness
//! guard and skipped when already up to date, so a second run with no source
//! changes writes nothing. Files are processed in parallel on the rayon pool;
//! the task returns only after both passes of every file have finished.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::freshness::is_fresh;
use crate::imaging::{
    BackendError, EncodeParams, ImageBackend, OutputFormat, Quality, RustBackend, is_convertible,
};
use crate::source_set::{SourceFile, SourceSet, SourceSetError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ImageError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("{path}: {source}")]
    Backend {
        path: PathBuf,
        source: BackendError,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Derived outputs to produce for one source.
#[derive(Debug, Clone, PartialEq)]
struct Planned {
    format: OutputFormat,
    dest: PathBuf,
}

/// Settings shared by every file in one run.
struct Plan<'a> {
    dest_dir: &'a Path,
    webp: bool,
    avif: bool,
    quality: Quality,
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

impl Plan<'_> {
    /// Outputs for `source`, conversions first, compression last.
    fn outputs(&self, source: &Path) -> (Vec<Planned>, bool) {
        let mut outputs = Vec::new();
        let mut skipped = false;
        let Some(file_name) = source.file_name() else {
            return (outputs, true);
        };

        if !is_svg(source) {
            if is_convertible(source) {
                let enabled = [(OutputFormat::WebP, self.webp), (OutputFormat::Avif, self.avif)];
                for (format, on) in enabled {
                    let Some(ext) = format.extension().filter(|_| on) else {
                        continue;
                    };
                    let dest = self.dest_dir.join(file_name).with_extension(ext);
                    // A .webp source's conversion would overwrite its own compressed copy
                    if dest.file_name() == Some(file_name) {
                        continue;
                    }
                    outputs.push(Planned { format, dest });
                }
            } else {
                skipped = true;
            }
        }

        outputs.push(Planned {
            format: OutputFormat::Optimized,
            dest: self.dest_dir.join(file_name),
        });
        (outputs, skipped)
    }
}

fn process_file(
    backend: &impl ImageBackend,
    plan: &Plan<'_>,
    source: &SourceFile,
) -> Result<TaskReport, ImageError> {
    let mut report = TaskReport::new("images");
    let (outputs, skipped) = plan.outputs(&source.path);
    if skipped {
        warn!("{}: not a convertible image, compressing only", source.relative);
        report.skip(&source.path);
    }

    for planned in outputs {
        if is_fresh(&source.path, &planned.dest) {
            debug!("{} is fresh", planned.dest.display());
            report.kept_fresh(planned.dest);
            continue;
        }
        let bytes = backend
            .encode(&EncodeParams {
                source: source.path.clone(),
                format: planned.format,
                quality: plan.quality,
            })
            .map_err(|e| ImageError::Backend {
                path: source.path.clone(),
                source: e,
            })?;
        let artifact = Artifact::new(planned.dest, bytes);
        write_artifact(&artifact).map_err(|e| ImageError::Write {
            path: artifact.path.clone(),
            source: e,
        })?;
        report.wrote(artifact.path);
    }
    Ok(report)
}

pub fn run(project: &Project) -> Result<TaskReport, ImageError> {
    run_with_backend(&RustBackend::new(), project)
}

/// Run the task with a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    project: &Project,
) -> Result<TaskReport, ImageError> {
    let config = &project.config.images;
    let sources = SourceSet::new(&config.sources)?.resolve(&project.app_root)?;
    let dest_dir = project.app_path(&config.dest);
    let plan = Plan {
        dest_dir: &dest_dir,
        webp: config.webp,
        avif: config.avif,
        quality: Quality::new(config.quality),
    };

    let reports = sources
        .par_iter()
        .map(|source| process_file(backend, &plan, source))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = TaskReport::new("images");
    for r in reports {
        report.absorb(r);
    }
    Ok(report)
}
