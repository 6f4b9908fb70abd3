//! Include-directive resolver for page templates.
//!
//! Pages pull shared fragments in with comment directives:
//!
//! ```text
//! <!--=include header.html -->
//! <!--=include card.html {"title": "Home"} -->
//! <!--=require analytics.html -->
//! //=include snippet.js
//! /*=include banner.css */
//! ```
//!
//! A directive is replaced by the referenced file's content. Paths resolve
//! relative to the including file first, then against the components
//! directory. The optional JSON object after the path is substituted into the
//! fragment as `@@key` tokens; parameters are inherited by nested includes.
//! `require` inlines a file at most once per page. A file that includes itself,
//! directly or through other fragments, is an error. A directive whose target
//! cannot be found is dropped with a warning.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum IncludeError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("include cycle: {0}")]
    Cycle(String),
    #[error("invalid parameters for '{target}': {source}")]
    Params {
        target: String,
        source: serde_json::Error,
    },
}

/// Substitution values for `@@key` tokens.
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Include,
    Require,
}

/// A directive located in template text. `start..end` covers the whole
/// directive, delimiters included.
#[derive(Debug, PartialEq, Eq)]
struct Directive<'a> {
    start: usize,
    end: usize,
    kind: Kind,
    target: &'a str,
    params: Option<&'a str>,
}

/// Comment openers paired with their terminators. `//=` runs to end of line.
const DELIMITERS: &[(&str, &str)] = &[("<!--=", "-->"), ("/*=", "*/"), ("//=", "\n")];

const KEYWORDS: &[(&str, Kind)] = &[("include", Kind::Include), ("require", Kind::Require)];

/// Find the first complete directive at or after `from`.
fn find_directive(text: &str, from: usize) -> Option<Directive<'_>> {
    let mut search = from;
    loop {
        let (start, open, close, kind, keyword) = DELIMITERS
            .iter()
            .flat_map(|(open, close)| KEYWORDS.iter().map(move |(kw, kind)| (open, close, kw, kind)))
            .filter_map(|(open, close, kw, kind)| {
                let needle = format!("{open}{kw}");
                text[search..]
                    .find(&needle)
                    .map(|pos| (search + pos, *open, *close, *kind, *kw))
            })
            .min_by_key(|(pos, ..)| *pos)?;

        let body_start = start + open.len() + keyword.len();
        let body_end = match text[body_start..].find(close) {
            Some(offset) => body_start + offset,
            // A line comment may end the file
            None if close == "\n" => text.len(),
            None => {
                search = start + 1;
                continue;
            }
        };
        // `<!--=included` and friends are not directives
        let body = &text[body_start..body_end];
        if !body.starts_with(char::is_whitespace) {
            search = start + 1;
            continue;
        }

        let body = body.trim();
        let (target, params) = match body.find(char::is_whitespace) {
            Some(split) => (&body[..split], Some(body[split..].trim())),
            None => (body, None),
        };
        let target = target.trim_matches(|c| c == '"' || c == '\'');
        if target.is_empty() {
            search = start + 1;
            continue;
        }
        let end = if close == "\n" {
            body_end
        } else {
            body_end + close.len()
        };
        return Some(Directive {
            start,
            end,
            kind,
            target,
            params: params.filter(|p| !p.is_empty()),
        });
    }
}

fn parse_params(raw: &str, target: &str) -> Result<Params, IncludeError> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(|source| IncludeError::Params {
            target: target.to_string(),
            source,
        })?;
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, value)
        })
        .collect())
}

/// Replace `@@key` tokens. Longer keys first so `@@title` does not clobber
/// `@@titleColor`.
fn substitute(text: &str, params: &Params) -> String {
    if params.is_empty() || !text.contains("@@") {
        return text.to_string();
    }
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let mut out = text.to_string();
    for key in keys {
        out = out.replace(&format!("@@{key}"), &params[key]);
    }
    out
}

/// Result of rendering one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Directive targets that could not be found.
    pub missing: Vec<String>,
}

#[derive(Default)]
struct RenderState {
    stack: Vec<PathBuf>,
    required: HashSet<PathBuf>,
    missing: Vec<String>,
}

/// Resolves include directives against a components directory.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    components: PathBuf,
}

impl IncludeResolver {
    pub fn new(components: impl Into<PathBuf>) -> Self {
        Self {
            components: components.into(),
        }
    }

    /// Render the template at `page` with every directive resolved.
    pub fn render_file(&self, page: &Path) -> Result<Rendered, IncludeError> {
        let text = read(page)?;
        self.render(&text, page)
    }

    /// Render `text` as though it were the content of `origin`.
    pub fn render(&self, text: &str, origin: &Path) -> Result<Rendered, IncludeError> {
        let mut state = RenderState::default();
        state.stack.push(identity(origin));
        let html = self.expand(text, origin, &Params::new(), &mut state)?;
        Ok(Rendered {
            html,
            missing: state.missing,
        })
    }

    fn locate(&self, origin: &Path, target: &str) -> Option<PathBuf> {
        let sibling = origin.parent().map(|dir| dir.join(target));
        let component = self.components.join(target);
        sibling
            .into_iter()
            .chain(std::iter::once(component))
            .find(|p| p.is_file())
    }

    fn expand(
        &self,
        text: &str,
        origin: &Path,
        params: &Params,
        state: &mut RenderState,
    ) -> Result<String, IncludeError> {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(directive) = find_directive(text, cursor) {
            out.push_str(&text[cursor..directive.start]);
            cursor = directive.end;

            let Some(path) = self.locate(origin, directive.target) else {
                warn!(
                    "{}: include '{}' not found",
                    origin.display(),
                    directive.target
                );
                state.missing.push(directive.target.to_string());
                continue;
            };
            let key = identity(&path);
            if state.stack.contains(&key) {
                let chain: Vec<String> = state
                    .stack
                    .iter()
                    .chain(std::iter::once(&key))
                    .map(|p| p.display().to_string())
                    .collect();
                return Err(IncludeError::Cycle(chain.join(" -> ")));
            }
            if directive.kind == Kind::Require && !state.required.insert(key.clone()) {
                continue;
            }

            let mut scoped = params.clone();
            if let Some(raw) = directive.params {
                scoped.extend(parse_params(raw, directive.target)?);
            }
            let fragment = substitute(&read(&path)?, &scoped);

            state.stack.push(key);
            let expanded = self.expand(&fragment, &path, &scoped, state)?;
            state.stack.pop();
            out.push_str(&expanded);
        }

        out.push_str(&text[cursor..]);
        Ok(out)
    }
}

fn read(path: &Path) -> Result<String, IncludeError> {
    fs::read_to_string(path).map_err(|source| IncludeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Canonical form used for cycle and `require` bookkeeping.
fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
