//! The named pipeline tasks.
//!
//! Each task is a synchronous function from a [`Project`] to a
//! [`TaskReport`]. Tasks only talk to each other through the working tree:
//! nothing one task computes in memory is visible to another.
//!
//! | Task | Reads | Writes |
//! |---|---|---|
//! | `styles` | `scss/main.scss` | `css/style.min.css` |
//! | `scripts` | `js/main.js` | `js/main.min.js` |
//! | `images` | `images/src/*` | `images/*.{webp,avif}`, optimized copies |
//! | `fonts` | `fonts/src/*.ttf` | `fonts/*.woff2` |
//! | `sprite` | `images/*.svg` | `images/sprite.svg`, preview page |
//! | `pages` | `pages/*.html`, `components/*` | `*.html` |
//! | `clean` | | removes `dist/` |
//! | `package` | allow-listed artifacts | `dist/` |

pub mod clean;
pub mod fonts;
pub mod images;
pub mod package;
pub mod pages;
pub mod scripts;
pub mod sprite;
pub mod styles;

use crate::artifact::TaskReport;
use crate::compose::TaskExecutor;
use crate::config::Project;
use crate::reload::ReloadEvent;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

pub use clean::CleanError;
pub use fonts::FontError;
pub use images::ImageError;
pub use package::PackageError;
pub use pages::PageError;
pub use scripts::ScriptError;
pub use sprite::SpriteError;
pub use styles::StyleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    Styles,
    Scripts,
    Images,
    Fonts,
    Sprite,
    Pages,
    Clean,
    Package,
}

impl TaskName {
    pub const ALL: [TaskName; 8] = [
        TaskName::Styles,
        TaskName::Scripts,
        TaskName::Images,
        TaskName::Fonts,
        TaskName::Sprite,
        TaskName::Pages,
        TaskName::Clean,
        TaskName::Package,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Styles => "styles",
            TaskName::Scripts => "scripts",
            TaskName::Images => "images",
            TaskName::Fonts => "fonts",
            TaskName::Sprite => "sprite",
            TaskName::Pages => "pages",
            TaskName::Clean => "clean",
            TaskName::Package => "package",
        }
    }

    /// Notification for live-reload clients after a successful run.
    pub fn reload_event(self) -> Option<ReloadEvent> {
        match self {
            TaskName::Styles => Some(ReloadEvent::Styles),
            TaskName::Scripts | TaskName::Pages => Some(ReloadEvent::Full),
            _ => None,
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown task '{s}'"))
    }
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("styles: {0}")]
    Styles(#[from] StyleError),
    #[error("scripts: {0}")]
    Scripts(#[from] ScriptError),
    #[error("images: {0}")]
    Images(#[from] ImageError),
    #[error("fonts: {0}")]
    Fonts(#[from] FontError),
    #[error("sprite: {0}")]
    Sprite(#[from] SpriteError),
    #[error("pages: {0}")]
    Pages(#[from] PageError),
    #[error("clean: {0}")]
    Clean(#[from] CleanError),
    #[error("package: {0}")]
    Package(#[from] PackageError),
}

impl TaskError {
    pub fn task(&self) -> TaskName {
        match self {
            TaskError::Styles(_) => TaskName::Styles,
            TaskError::Scripts(_) => TaskName::Scripts,
            TaskError::Images(_) => TaskName::Images,
            TaskError::Fonts(_) => TaskName::Fonts,
            TaskError::Sprite(_) => TaskName::Sprite,
            TaskError::Pages(_) => TaskName::Pages,
            TaskError::Clean(_) => TaskName::Clean,
            TaskError::Package(_) => TaskName::Package,
        }
    }
}

/// Run one task against the project's working tree.
pub fn run_task(name: TaskName, project: &Project) -> Result<TaskReport, TaskError> {
    let start = Instant::now();
    info!(task = name.as_str(), "starting");
    let report = match name {
        TaskName::Styles => styles::run(project)?,
        TaskName::Scripts => scripts::run(project)?,
        TaskName::Images => images::run(project)?,
        TaskName::Fonts => fonts::run(project)?,
        TaskName::Sprite => sprite::run(project)?,
        TaskName::Pages => pages::run(project)?,
        TaskName::Clean => clean::run(project)?,
        TaskName::Package => package::run(project)?,
    };
    info!(
        task = name.as_str(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "finished: {report}"
    );
    Ok(report)
}

impl TaskExecutor for Project {
    fn execute(&self, name: TaskName) -> Result<TaskReport, TaskError> {
        run_task(name, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for task in TaskName::ALL {
            assert_eq!(task.as_str().parse::<TaskName>().unwrap(), task);
        }
        assert!("deploy".parse::<TaskName>().is_err());
    }

    #[test]
    fn reload_events_per_task() {
        assert_eq!(TaskName::Styles.reload_event(), Some(ReloadEvent::Styles));
        assert_eq!(TaskName::Scripts.reload_event(), Some(ReloadEvent::Full));
        assert_eq!(TaskName::Pages.reload_event(), Some(ReloadEvent::Full));
        assert_eq!(TaskName::Images.reload_event(), None);
        assert_eq!(TaskName::Package.reload_event(), None);
    }

    #[test]
    fn error_carries_task_name() {
        let err = TaskError::from(CleanError::Remove {
            path: "dist".into(),
            source: std::io::Error::other("busy"),
        });
        assert_eq!(err.task(), TaskName::Clean);
        assert!(err.to_string().starts_with("clean: removing dist"));
    }
}
