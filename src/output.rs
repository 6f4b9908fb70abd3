//! CLI output formatting for task runs.
//!
//! # Output Format
//!
//! One block per task: a header with the task's summary, then the files it
//! wrote as indented paths relative to the project directory. Fresh outputs
//! are counted in the header but not listed.
//!
//! ```text
//! images: 2 written, 3 fresh (5 total), 1 skipped
//!     app/images/dawn.webp
//!     app/images/dawn.jpg
//!     skipped: app/images/src/favicon.ico
//! clean: 1 removed
//!     dist
//!
//! 3 tasks, 2 files written
//! ```
//!
//! # Architecture
//!
//! Each block has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::artifact::TaskReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `base` when it lies inside it.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format one task's report.
pub fn format_task_report(report: &TaskReport, base: &Path) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", report.task, report)];
    for path in report.written.iter().chain(&report.removed) {
        lines.push(format!("{}{}", indent(1), display_path(path, base)));
    }
    for path in &report.skipped {
        lines.push(format!(
            "{}skipped: {}",
            indent(1),
            display_path(path, base)
        ));
    }
    lines
}

pub fn print_task_report(report: &TaskReport, base: &Path) {
    for line in format_task_report(report, base) {
        println!("{}", line);
    }
}

/// Format the closing line after a composition.
pub fn format_summary(reports: &[TaskReport]) -> String {
    let written: usize = reports.iter().map(|r| r.written.len()).sum();
    let tasks = reports.len();
    format!(
        "{} task{}, {} file{} written",
        tasks,
        if tasks == 1 { "" } else { "s" },
        written,
        if written == 1 { "" } else { "s" }
    )
}

/// Print every report followed by the summary line.
pub fn print_run(reports: &[TaskReport], base: &Path) {
    for report in reports {
        print_task_report(report, base);
    }
    println!();
    println!("{}", format_summary(reports));
}
