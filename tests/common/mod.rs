//! Project-tree fixtures shared by the integration tests.

use siteforge::config::{PipelineConfig, Project};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const MAIN_SCSS: &str = "$accent: #c03;\n@import 'blocks/header';\nbody { color: $accent; }\n";
pub const HEADER_SCSS: &str = ".header { user-select: none; a { color: red; } }\n";
pub const MAIN_JS: &str = "function greet(name) {\n    // say hello\n    return 'hello ' + name;\n}\n";
pub const ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M0 0h24v24H0z"/></svg>"#;
pub const INDEX_HTML: &str =
    "<!doctype html>\n<html><body>\n<!--=include header.html -->\n<main>@@title</main>\n</body></html>\n";
pub const HEADER_HTML: &str = "<header>Site header</header>";

/// A temp project with one source for every task that reads the working tree.
pub fn project_tree() -> (TempDir, Project) {
    let tmp = TempDir::new().unwrap();
    let project = Project::new(tmp.path(), PipelineConfig::default());
    let app = &project.app_root;

    write(app, "scss/main.scss", MAIN_SCSS);
    write(app, "scss/blocks/_header.scss", HEADER_SCSS);
    write(app, "js/main.js", MAIN_JS);
    write(app, "images/menu.svg", ICON_SVG);
    write(app, "pages/index.html", INDEX_HTML);
    write(app, "components/header.html", HEADER_HTML);
    write_png(&app.join("images/src/dawn.png"));

    (tmp, project)
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn write_png(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(16, 12, |x, y| image::Rgb([(x * 16) as u8, (y * 20) as u8, 128]));
    img.save(path).unwrap();
}

/// Every file under `root`, as sorted slash-separated relative paths.
pub fn tree(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
