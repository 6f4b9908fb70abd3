//! Clean task: delete the output tree.

use crate::artifact::TaskReport;
use crate::config::{Project, tree_contains};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("removing {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("refusing to remove {dist}: it contains the working tree {app}")]
    ContainsWorkingTree { dist: PathBuf, app: PathBuf },
}

/// Remove `dist_dir` recursively. A missing tree is not an error.
///
/// Refuses when the output tree is, or encloses, the working tree; that
/// configuration is rejected at load time but a hand-built [`Project`] can
/// still carry it.
pub fn run(project: &Project) -> Result<TaskReport, CleanError> {
    let mut report = TaskReport::new("clean");
    if tree_contains(&project.dist_root, &project.app_root) {
        return Err(CleanError::ContainsWorkingTree {
            dist: project.dist_root.clone(),
            app: project.app_root.clone(),
        });
    }
    match std::fs::remove_dir_all(&project.dist_root) {
        Ok(()) => report.remove(&project.dist_root),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(CleanError::Remove {
                path: project.dist_root.clone(),
                source,
            });
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn removes_populated_tree() {
        let tmp = TempDir::new().unwrap();
        let project = Project::new(tmp.path(), PipelineConfig::default());
        fs::create_dir_all(project.dist_root.join("css")).unwrap();
        fs::write(project.dist_root.join("css/old.css"), "x").unwrap();

        let report = run(&project).unwrap();
        assert_eq!(report.removed, vec![project.dist_root.clone()]);
        assert!(!project.dist_root.exists());
    }

    #[test]
    fn missing_tree_is_noop() {
        let tmp = TempDir::new().unwrap();
        let project = Project::new(tmp.path(), PipelineConfig::default());
        let report = run(&project).unwrap();
        assert!(report.removed.is_empty());
    }

    #[test]
    fn working_tree_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let project = Project::new(tmp.path(), PipelineConfig::default());
        fs::create_dir_all(&project.app_root).unwrap();
        fs::write(project.app_root.join("index.html"), "x").unwrap();
        fs::create_dir_all(&project.dist_root).unwrap();

        run(&project).unwrap();
        assert!(project.app_root.join("index.html").exists());
    }

    #[test]
    fn refuses_output_tree_enclosing_working_tree() {
        for dist in ["", ".", "./app", "app"] {
            let tmp = TempDir::new().unwrap();
            let config = PipelineConfig {
                dist_dir: dist.to_string(),
                ..PipelineConfig::default()
            };
            let project = Project::new(tmp.path(), config);
            fs::create_dir_all(project.app_root.join("pages")).unwrap();
            fs::write(project.app_root.join("pages/index.html"), "x").unwrap();

            let result = run(&project);
            assert!(
                matches!(result, Err(CleanError::ContainsWorkingTree { .. })),
                "dist_dir '{dist}'"
            );
            assert!(project.app_root.join("pages/index.html").exists());
        }
    }
}
