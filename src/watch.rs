//! Watch Bindings and the filesystem event loop.
//!
//! A [`WatchBinding`] pairs a set of working-tree patterns with an action:
//! re-run a task, or just tell browsers to reload. The default bindings:
//!
//! | Patterns | Action |
//! |---|---|
//! | `styles.watch` (`scss/**/*.scss`) | styles |
//! | `images.sources` (`images/src/*.*`, shallow) | images |
//! | `scripts.entries` (`js/main.js`) | scripts |
//! | `<components>/*`, `pages.sources` | pages |
//! | `*.html` at the working root | reload only |
//!
//! Every create, modify or remove event is checked against every binding
//! independently, and each match spawns its own task run. There is no
//! debouncing beyond what the platform watcher does. Re-runs go through
//! [`Composition::tolerant`] so a failing task never stops the watcher.

use crate::compose::{Composition, Runner};
use crate::config::PipelineConfig;
use crate::reload::ReloadEvent;
use crate::source_set::{SourceSet, SourceSetError, relative_slash_path};
use crate::tasks::TaskName;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Pattern(#[from] SourceSetError),
    #[error("cannot watch {path}: {source}")]
    Notify {
        path: PathBuf,
        source: notify::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Run(TaskName),
    Reload,
}

#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub patterns: SourceSet,
    pub action: WatchAction,
}

impl WatchBinding {
    pub fn new<S: AsRef<str>>(patterns: &[S], action: WatchAction) -> Result<Self, WatchError> {
        Ok(Self {
            patterns: SourceSet::new(patterns)?,
            action,
        })
    }
}

/// Bindings for the develop session, derived from the configuration.
pub fn default_bindings(config: &PipelineConfig) -> Result<Vec<WatchBinding>, WatchError> {
    let mut page_patterns = vec![format!("{}/*", config.pages.components.trim_end_matches('/'))];
    page_patterns.extend(config.pages.sources.iter().cloned());

    Ok(vec![
        WatchBinding::new(&config.styles.watch, WatchAction::Run(TaskName::Styles))?,
        WatchBinding::new(&config.images.sources, WatchAction::Run(TaskName::Images))?,
        WatchBinding::new(&config.scripts.entries, WatchAction::Run(TaskName::Scripts))?,
        WatchBinding::new(&page_patterns, WatchAction::Run(TaskName::Pages))?,
        WatchBinding::new(&["*.html"], WatchAction::Reload)?,
    ])
}

/// Actions fired by a change to the working-tree relative path `relative`.
pub fn actions_for(bindings: &[WatchBinding], relative: &str) -> Vec<WatchAction> {
    bindings
        .iter()
        .filter(|b| b.patterns.matches(relative))
        .map(|b| b.action)
        .collect()
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Keeps the platform watcher and the dispatch loop alive; dropping it
/// stops both.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching `root` recursively, dispatching matches through `runner`.
pub fn spawn(
    root: &Path,
    bindings: Vec<WatchBinding>,
    runner: Arc<Runner>,
) -> Result<WatchHandle, WatchError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notify_err = |source| WatchError::Notify {
        path: root.to_path_buf(),
        source,
    };
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        Config::default(),
    )
    .map_err(notify_err)?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(notify_err)?;

    // Some platforms report canonical paths
    let roots: Vec<PathBuf> = std::iter::once(root.to_path_buf())
        .chain(root.canonicalize().ok())
        .collect();
    let task = tokio::spawn(async move {
        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) => dispatch(&roots, &bindings, &runner, &event),
                Err(e) => warn!("watch error: {e}"),
            }
        }
    });

    Ok(WatchHandle {
        _watcher: watcher,
        task,
    })
}

fn dispatch(roots: &[PathBuf], bindings: &[WatchBinding], runner: &Arc<Runner>, event: &Event) {
    if !is_change(&event.kind) {
        return;
    }
    for path in &event.paths {
        let Some(relative) = roots.iter().find_map(|r| relative_slash_path(r, path)) else {
            continue;
        };
        for action in actions_for(bindings, &relative) {
            debug!("{relative} changed -> {action:?}");
            match action {
                WatchAction::Run(task) => {
                    tokio::spawn(Composition::Task(task).tolerant().run(runner.clone()));
                }
                WatchAction::Reload => {
                    if let Some(bus) = runner.bus() {
                        bus.publish(ReloadEvent::Full);
                    }
                }
            }
        }
    }
}
