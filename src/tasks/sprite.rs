//! SVG sprite task (stack mode).
//!
//! Every icon becomes a nested `<svg id="<stem>">` inside one document. A
//! stylesheet in the sprite hides all icons except the one named by the URL
//! fragment, so `sprite.svg#search` renders just the search icon wherever
//! an image URL is accepted:
//!
//! ```text
//! <svg xmlns=...>
//!   <style>:root>svg{display:none}:root>svg:target{display:block}</style>
//!   <svg id="search" viewBox="0 0 24 24">...</svg>
//!   <svg id="close" viewBox="0 0 16 16">...</svg>
//! </svg>
//! ```
//!
//! A preview page listing each icon and its URL is written alongside when
//! `sprite.example` is set.

use crate::artifact::{Artifact, TaskReport, write_artifact};
use crate::config::Project;
use crate::source_set::{SourceSet, SourceSetError};
use maud::{DOCTYPE, Markup, html};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error(transparent)]
    SourceSet(#[from] SourceSetError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {message}")]
    Parse { path: PathBuf, message: String },
}

const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:block}";

/// Root attributes that the nested `<svg>` replaces or that only make sense
/// on a standalone document.
const DROPPED_ATTRIBUTES: &[&str] = &["id", "width", "height", "viewBox", "x", "y", "version"];

/// One icon, ready to nest in the sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub id: String,
    pub view_box: Option<String>,
    /// Presentation attributes carried over from the icon's root.
    pub attributes: Vec<(String, String)>,
    /// Prefixed namespace declarations in scope on the icon's root, so
    /// `inkscape:label` and friends stay well-formed once nested.
    pub namespaces: Vec<(String, String)>,
    /// Markup between the root's start and end tags.
    pub inner: String,
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

/// Byte offset just past the `>` closing the start tag at the front of
/// `element`, skipping over quoted attribute values.
fn start_tag_end(element: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in element.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Parse one SVG document into an [`Icon`] with the given id.
pub fn parse_icon(id: &str, text: &str) -> Result<Icon, String> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| e.to_string())?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(format!("root element is <{}>, not <svg>", root.tag_name().name()));
    }

    let view_box = root.attribute("viewBox").map(str::to_string).or_else(|| {
        let width = root.attribute("width").and_then(parse_length)?;
        let height = root.attribute("height").and_then(parse_length)?;
        Some(format!("0 0 {width} {height}"))
    });
    let attributes = root
        .attributes()
        .filter(|a| a.namespace().is_none() && !DROPPED_ATTRIBUTES.contains(&a.name()))
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();
    let namespaces = root
        .namespaces()
        .filter_map(|ns| Some((ns.name()?, ns.uri())))
        .filter(|(prefix, _)| *prefix != "xml")
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect();

    let element = &text[root.range()];
    let open_end = start_tag_end(element).ok_or("unterminated <svg> start tag")?;
    let inner = if element[..open_end].ends_with("/>") {
        String::new()
    } else {
        let close = element.rfind("</").unwrap_or(element.len());
        element[open_end..close.max(open_end)].trim().to_string()
    };

    Ok(Icon {
        id: id.to_string(),
        view_box,
        attributes,
        namespaces,
        inner,
    })
}

/// Assemble the stack-mode sprite document.
pub fn render_sprite(icons: &[Icon]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
    );
    out.push_str("<style>");
    out.push_str(STACK_STYLE);
    out.push_str("</style>");
    for icon in icons {
        out.push_str(&format!(r#"<svg id="{}""#, escape_attr(&icon.id)));
        if let Some(view_box) = &icon.view_box {
            out.push_str(&format!(r#" viewBox="{}""#, escape_attr(view_box)));
        }
        for (name, value) in &icon.attributes {
            out.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
        }
        for (prefix, uri) in &icon.namespaces {
            out.push_str(&format!(r#" xmlns:{}="{}""#, prefix, escape_attr(uri)));
        }
        out.push('>');
        out.push_str(&icon.inner);
        out.push_str("</svg>");
    }
    out.push_str("</svg>");
    out
}

/// `/`-separated link from the document at `from_file` to `to_file`, both
/// relative to the same root.
fn relative_href(from_file: &str, to_file: &str) -> String {
    let mut from_dirs: Vec<&str> = from_file.split('/').collect();
    from_dirs.pop();
    let to: Vec<&str> = to_file.split('/').collect();
    let to_dirs = &to[..to.len().saturating_sub(1)];
    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts = vec![".."; from_dirs.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Preview page listing every icon with its sprite URL.
pub fn render_example(icons: &[Icon], sprite_href: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "SVG stack sprite" }
                style {
                    "body{font-family:sans-serif;margin:2em}"
                    "ul{list-style:none;padding:0;display:flex;flex-wrap:wrap;gap:1.5em}"
                    "li{text-align:center}img{width:48px;height:48px;display:block;margin:0 auto .5em}"
                }
            }
            body {
                h1 { "SVG stack sprite" }
                p { (icons.len()) " icons in " code { (sprite_href) } }
                ul {
                    @for icon in icons {
                        @let url = format!("{}#{}", sprite_href, icon.id);
                        li {
                            img src=(url) alt=(icon.id);
                            code { (url) }
                        }
                    }
                }
            }
        }
    }
}

pub fn run(project: &Project) -> Result<TaskReport, SpriteError> {
    let config = &project.config.sprite;
    let mut report = TaskReport::new("sprite");
    let output = project.app_path(&config.output);

    let mut icons = Vec::new();
    for source in SourceSet::new(&config.sources)?.resolve(&project.app_root)? {
        if source.path == output {
            continue;
        }
        let Some(stem) = source.path.file_stem().map(|s| s.to_string_lossy().into_owned())
        else {
            continue;
        };
        let text = std::fs::read_to_string(&source.path).map_err(|e| SpriteError::Io {
            path: source.path.clone(),
            source: e,
        })?;
        let icon = parse_icon(&stem, &text).map_err(|message| SpriteError::Parse {
            path: source.path.clone(),
            message,
        })?;
        icons.push(icon);
    }
    if icons.is_empty() {
        return Ok(report);
    }

    let mut artifacts = vec![Artifact::new(&output, render_sprite(&icons))];
    if !config.example.is_empty() {
        let href = relative_href(&config.example, &config.output);
        artifacts.push(Artifact::new(
            project.app_path(&config.example),
            render_example(&icons, &href).into_string(),
        ));
    }
    for artifact in artifacts {
        write_artifact(&artifact).map_err(|e| SpriteError::Io {
            path: artifact.path.clone(),
            source: e,
        })?;
        report.wrote(artifact.path);
    }
    Ok(report)
}
