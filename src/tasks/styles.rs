//! Stylesheet task: Sass compile, vendor prefix, minify.
//!
//! Every file in the entry set is compiled with `grass` and the results are
//! joined into one stylesheet. `lightningcss` then adds the vendor prefixes
//! the configured browserslist needs and minifies the whole unit, which is
//! written to the single output path.
//!
//! Prefixing runs on compiled CSS, so the compile step comes first.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::source_set::{SourceSet, SourceSetError};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StyleError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("{path}: {message}")]
    Compile { path: PathBuf, message: String },
    #[error("invalid browser query: {0}")]
    Browsers(String),
    #[error("CSS post-processing failed: {0}")]
    Css(String),
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Compile one Sass/SCSS file to CSS.
pub fn compile(path: &Path) -> Result<String, StyleError> {
    let mut options = grass::Options::default();
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    grass::from_path(path, &options).map_err(|e| StyleError::Compile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn targets(browsers: &[String]) -> Result<Targets, StyleError> {
    let browsers = Browsers::from_browserslist(browsers.iter().map(String::as_str))
        .map_err(|e| StyleError::Browsers(e.to_string()))?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Add vendor prefixes for `browsers` and minify.
pub fn prefix_and_minify(css: &str, browsers: &[String]) -> Result<String, StyleError> {
    let targets = targets(browsers)?;
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| StyleError::Css(e.to_string()))?;
    sheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| StyleError::Css(e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| StyleError::Css(e.to_string()))?;
    Ok(printed.code)
}

pub fn run(project: &Project) -> Result<TaskReport, StyleError> {
    let config = &project.config.styles;
    let mut report = TaskReport::new("styles");

    let entries = SourceSet::new(&config.entry)?.resolve(&project.app_root)?;
    if entries.is_empty() {
        info!("styles: no entry stylesheet matched {:?}", config.entry);
        return Ok(report);
    }

    let mut compiled = String::new();
    for entry in &entries {
        debug!("compiling {}", entry.relative);
        compiled.push_str(&compile(&entry.path)?);
        compiled.push('\n');
    }

    let css = prefix_and_minify(&compiled, &config.browsers)?;
    let artifact = Artifact::new(project.app_path(&config.output), css);
    write_artifact(&artifact).map_err(|source| StyleError::Write {
        path: artifact.path.clone(),
        source,
    })?;
    report.wrote(artifact.path);
    Ok(report)
}
