//! Task compositions and the async runner.
//!
//! A [`Composition`] is a tree: leaves run one task (or the dev server),
//! inner nodes order their children.
//!
//! - **Parallel**: every member starts at once. Resolves `Ok` when all
//!   succeed. On the first failure it resolves `Err` and leaves the other
//!   members running to completion; nothing is cancelled.
//! - **Series**: each member starts after its predecessor succeeded. The
//!   first failure ends the series.
//! - **Tolerant**: logs its member's failure and resolves `Ok`, so a broken
//!   stylesheet does not take the dev server down with it.
//!
//! The two entry points:
//!
//! ```text
//! develop = parallel(tolerant(styles), tolerant(images),
//!                    tolerant(scripts), tolerant(pages), serve)
//! build   = series(clean, package)
//! ```
//!
//! Tasks are synchronous and run on tokio's blocking pool; each one's
//! completion is a joined handle, so a composition never reports success
//! before every file its members write is on disk.

use crate::artifact::TaskReport;
use crate::reload::ReloadBus;
use crate::serve::{DevSettings, ServeError};
use crate::tasks::{TaskError, TaskName};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("task worker failed: {0}")]
    Join(#[from] JoinError),
    #[error(transparent)]
    Serve(#[from] ServeError),
    #[error("no dev server configured for this runner")]
    NoDevServer,
}

/// Runs a named task to completion. Implemented by
/// [`Project`](crate::config::Project); tests substitute a recorder.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, name: TaskName) -> Result<TaskReport, TaskError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    Task(TaskName),
    /// Dev server plus watchers; runs until Ctrl-C.
    Serve,
    Parallel(Vec<Composition>),
    Series(Vec<Composition>),
    Tolerant(Box<Composition>),
}

impl Composition {
    pub fn parallel(members: impl IntoIterator<Item = Composition>) -> Self {
        Composition::Parallel(members.into_iter().collect())
    }

    pub fn series(members: impl IntoIterator<Item = Composition>) -> Self {
        Composition::Series(members.into_iter().collect())
    }

    pub fn tolerant(self) -> Self {
        Composition::Tolerant(Box::new(self))
    }

    /// Initial build of the four working-tree tasks alongside the dev server.
    pub fn develop() -> Self {
        let initial = [
            TaskName::Styles,
            TaskName::Images,
            TaskName::Scripts,
            TaskName::Pages,
        ];
        Composition::parallel(
            initial
                .into_iter()
                .map(|t| Composition::Task(t).tolerant())
                .chain(std::iter::once(Composition::Serve)),
        )
    }

    /// Clean the output tree, then repopulate it.
    pub fn build() -> Self {
        Composition::series([
            Composition::Task(TaskName::Clean),
            Composition::Task(TaskName::Package),
        ])
    }

    pub fn run(self, runner: Arc<Runner>) -> BoxFuture<'static, Result<(), ComposeError>> {
        async move {
            match self {
                Composition::Task(name) => runner.run_task(name).await,
                Composition::Serve => runner.serve().await,
                Composition::Parallel(members) => {
                    let mut set = JoinSet::new();
                    for member in members {
                        set.spawn(member.run(runner.clone()));
                    }
                    while let Some(joined) = set.join_next().await {
                        let outcome = joined.map_err(ComposeError::from).and_then(|r| r);
                        if let Err(e) = outcome {
                            // Dropping the set would abort the siblings
                            set.detach_all();
                            return Err(e);
                        }
                    }
                    Ok(())
                }
                Composition::Series(members) => {
                    for member in members {
                        member.run(runner.clone()).await?;
                    }
                    Ok(())
                }
                Composition::Tolerant(member) => {
                    if let Err(e) = member.run(runner).await {
                        error!("{e}");
                    }
                    Ok(())
                }
            }
        }
        .boxed()
    }
}

/// Shared context for running compositions.
pub struct Runner {
    executor: Arc<dyn TaskExecutor>,
    bus: Option<ReloadBus>,
    dev: Option<DevSettings>,
    reports: Mutex<Vec<TaskReport>>,
}

impl Runner {
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            executor,
            bus: None,
            dev: None,
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Publish reload events after tasks succeed.
    pub fn with_reload(mut self, bus: ReloadBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Enable [`Composition::Serve`].
    pub fn with_dev_server(mut self, settings: DevSettings) -> Self {
        self.dev = Some(settings);
        self
    }

    pub fn bus(&self) -> Option<&ReloadBus> {
        self.bus.as_ref()
    }

    /// Reports of every task that succeeded so far, in completion order.
    pub fn reports(&self) -> Vec<TaskReport> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Run one task on the blocking pool and notify live-reload clients.
    pub async fn run_task(&self, name: TaskName) -> Result<(), ComposeError> {
        let executor = self.executor.clone();
        let report = tokio::task::spawn_blocking(move || executor.execute(name)).await??;
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
        if let (Some(bus), Some(event)) = (&self.bus, name.reload_event()) {
            bus.publish(event);
        }
        Ok(())
    }

    async fn serve(self: &Arc<Self>) -> Result<(), ComposeError> {
        let settings = self.dev.clone().ok_or(ComposeError::NoDevServer)?;
        crate::serve::run_dev_session(settings, self.clone()).await?;
        Ok(())
    }
}
