//! Glob-selected file collections.
//!
//! A [`SourceSet`] is an ordered list of patterns relative to the working
//! tree. Patterns prefixed with `!` exclude. A path belongs to the set when
//! the **last** pattern that matches it is a positive one, so a later, more
//! specific pattern can re-include what an earlier exclusion removed:
//!
//! ```text
//! images/*.*           include every image
//! !images/*.svg        ...except raw SVGs
//! images/sprite.svg    ...but keep the sprite
//! ```
//!
//! Matching is path-segment aware: `*` never crosses `/`, `**` spans any
//! number of directories (including none).
//!
//! Resolution walks only the literal base directory of each positive
//! pattern. A base that does not exist contributes nothing: an empty set is
//! a valid result, not an error.

use globset::{Glob, GlobBuilder, GlobMatcher};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceSetError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    matcher: GlobMatcher,
    negated: bool,
    /// Literal directory prefix (no glob metacharacters).
    base: PathBuf,
    /// Whether the pattern can match below its base's direct children.
    recursive: bool,
}

/// Ordered include/exclude glob patterns.
#[derive(Debug, Clone)]
pub struct SourceSet {
    rules: Vec<Rule>,
}

/// A resolved member of a source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (root-joined) path.
    pub path: PathBuf,
    /// `/`-separated path relative to the root the set was resolved against.
    pub relative: String,
}

impl SourceSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, SourceSetError> {
        let rules = patterns
            .iter()
            .map(|p| compile_rule(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.pattern.as_str())
    }

    /// Whether a root-relative, `/`-separated path is a member.
    pub fn matches(&self, relative: &str) -> bool {
        let mut included = false;
        for rule in &self.rules {
            if rule.matcher.is_match(relative) {
                included = !rule.negated;
            }
        }
        included
    }

    /// Resolve the set against `root`.
    ///
    /// Order follows the positive patterns, then path order within each
    /// pattern. A file matched by several patterns appears once, at its
    /// first position.
    pub fn resolve(&self, root: &Path) -> Result<Vec<SourceFile>, SourceSetError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for rule in self.rules.iter().filter(|r| !r.negated) {
            let base = root.join(&rule.base);
            if !base.is_dir() {
                continue;
            }
            let mut walker = WalkDir::new(&base).sort_by_file_name().min_depth(1);
            if !rule.recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker {
                let entry = entry.map_err(|source| SourceSetError::Walk {
                    path: base.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(relative) = relative_slash_path(root, entry.path()) else {
                    continue;
                };
                if !rule.matcher.is_match(&relative) || !self.matches(&relative) {
                    continue;
                }
                if seen.insert(relative.clone()) {
                    files.push(SourceFile {
                        path: entry.path().to_path_buf(),
                        relative,
                    });
                }
            }
        }

        Ok(files)
    }
}

fn compile_rule(raw: &str) -> Result<Rule, SourceSetError> {
    let (negated, pattern) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let pattern = pattern.trim_start_matches("./");
    let glob: Glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| SourceSetError::Pattern {
            pattern: raw.to_string(),
            source,
        })?;

    let (base, rest) = split_base(pattern);
    Ok(Rule {
        pattern: raw.to_string(),
        matcher: glob.compile_matcher(),
        negated,
        base,
        recursive: rest.contains("**") || rest.contains('/'),
    })
}

/// Split a pattern into its literal leading directories and the remainder.
///
/// `images/src/*.png` → (`images/src`, `*.png`); `**/*.html` → (``, `**/*.html`).
fn split_base(pattern: &str) -> (PathBuf, &str) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .take_while(|s| !has_glob_meta(s))
        .count();
    let base: PathBuf = segments[..literal].iter().collect();
    let rest_start: usize = segments[..literal].iter().map(|s| s.len() + 1).sum();
    (base, &pattern[rest_start.min(pattern.len())..])
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// `/`-separated path of `path` relative to `root`, or `None` if outside it.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
