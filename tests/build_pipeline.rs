//! End-to-end runs of the task pipeline against a generated project tree.

mod common;

use common::{project_tree, tree, write};
use siteforge::compose::{Composition, Runner};
use siteforge::tasks::{self, TaskName};
use std::fs;
use std::sync::Arc;

/// Run the working-tree tasks the way a develop session's initial build does.
async fn prepare(project: siteforge::config::Project) -> Arc<Runner> {
    let runner = Arc::new(Runner::new(Arc::new(project)));
    Composition::series([
        Composition::parallel([
            Composition::Task(TaskName::Styles),
            Composition::Task(TaskName::Scripts),
            Composition::Task(TaskName::Images),
            Composition::Task(TaskName::Pages),
        ]),
        Composition::Task(TaskName::Sprite),
    ])
    .run(runner.clone())
    .await
    .unwrap();
    runner
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn build_packages_exactly_the_allow_list() {
    let (_tmp, project) = project_tree();
    let dist = project.dist_root.clone();
    let runner = prepare(project).await;

    Composition::build().run(runner.clone()).await.unwrap();

    assert_eq!(
        tree(&dist),
        vec![
            "css/style.min.css",
            "images/dawn.png",
            "images/dawn.webp",
            "images/sprite.svg",
            "index.html",
            "js/main.min.js",
        ]
    );
    let tasks: Vec<String> = runner.reports().iter().map(|r| r.task.clone()).collect();
    assert!(tasks.ends_with(&["clean".to_string(), "package".to_string()]));
}

#[tokio::test]
async fn build_removes_stale_output() {
    let (_tmp, project) = project_tree();
    write(&project.dist_root, "old/leftover.css", "stale");
    let dist = project.dist_root.clone();
    let runner = prepare(project).await;

    Composition::build().run(runner).await.unwrap();

    assert!(!dist.join("old").exists());
    assert!(dist.join("css/style.min.css").exists());
}

#[test]
fn styles_are_compiled_prefixed_and_minified() {
    let (_tmp, project) = project_tree();
    tasks::run_task(TaskName::Styles, &project).unwrap();

    let css = fs::read_to_string(project.app_root.join("css/style.min.css")).unwrap();
    assert!(css.contains(".header a{color:red}"), "{css}");
    assert!(css.contains("-webkit-user-select:none"), "{css}");
    assert!(!css.contains('\n'), "{css}");
}

#[test]
fn pages_inline_components() {
    let (_tmp, project) = project_tree();
    tasks::run_task(TaskName::Pages, &project).unwrap();

    let html = fs::read_to_string(project.app_root.join("index.html")).unwrap();
    assert!(html.contains("<header>Site header</header>"));
    assert!(!html.contains("<!--="));
}

#[test]
fn sprite_collects_icons() {
    let (_tmp, project) = project_tree();
    tasks::run_task(TaskName::Sprite, &project).unwrap();

    let sprite = fs::read_to_string(project.app_root.join("images/sprite.svg")).unwrap();
    assert!(sprite.contains(r#"id="menu""#));
    assert!(project.app_root.join("images/stack/sprite.stack.html").exists());
}

#[test]
fn images_second_run_writes_nothing() {
    let (_tmp, project) = project_tree();
    let first = tasks::run_task(TaskName::Images, &project).unwrap();
    assert_eq!(first.written.len(), 2);

    let second = tasks::run_task(TaskName::Images, &project).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.fresh.len(), 2);
}

#[test]
fn single_tasks_succeed_on_empty_tree() {
    let tmp = tempfile::TempDir::new().unwrap();
    let project = siteforge::config::Project::new(tmp.path(), Default::default());
    for task in TaskName::ALL {
        let report = tasks::run_task(task, &project).unwrap();
        assert!(report.written.is_empty(), "{task}: {report}");
    }
}
