//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `siteforge.toml`. Every key has a
//! stock default that reproduces the conventional project layout, so the file
//! is optional and a user file only needs the values it wants to change.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── siteforge.toml           # Optional, overrides stock defaults
//! ├── app/                     # Working tree (`app_dir`)
//! │   ├── pages/*.html         # Page templates
//! │   ├── components/*         # Include fragments
//! │   ├── scss/main.scss       # Style entry
//! │   ├── js/main.js           # Script entry
//! │   ├── images/src/*         # Raw images
//! │   └── fonts/src/*.ttf      # Raw fonts
//! └── dist/                    # Output tree (`dist_dir`)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! app_dir = "app"
//! dist_dir = "dist"
//!
//! [styles]
//! entry = ["scss/main.scss"]
//! output = "css/style.min.css"
//! browsers = ["last 10 versions"]
//! watch = ["scss/**/*.scss"]
//!
//! [scripts]
//! entries = ["js/main.js"]      # Concatenated in this order
//! output = "js/main.min.js"
//!
//! [images]
//! sources = ["images/src/*.*"]
//! dest = "images"
//! webp = true
//! avif = false
//! quality = 80
//!
//! [server]
//! port = 3000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file inside the project directory.
pub const CONFIG_FILENAME: &str = "siteforge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `siteforge.toml`.
///
/// All paths inside the task sections are relative to `app_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Working tree, relative to the project directory.
    pub app_dir: String,
    /// Output tree produced by `build`, relative to the project directory.
    pub dist_dir: String,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub images: ImagesConfig,
    pub fonts: FontsConfig,
    pub sprite: SpriteConfig,
    pub pages: PagesConfig,
    pub package: PackageConfig,
    pub server: ServerConfig,
    pub processing: ProcessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            app_dir: "app".to_string(),
            dist_dir: "dist".to_string(),
            styles: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            images: ImagesConfig::default(),
            fonts: FontsConfig::default(),
            sprite: SpriteConfig::default(),
            pages: PagesConfig::default(),
            package: PackageConfig::default(),
            server: ServerConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 0-100".into(),
            ));
        }
        if self.scripts.entries.is_empty() {
            return Err(ConfigError::Validation(
                "scripts.entries must not be empty".into(),
            ));
        }
        if self.styles.browsers.is_empty() {
            return Err(ConfigError::Validation(
                "styles.browsers must not be empty".into(),
            ));
        }
        if self.package.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "package.patterns must not be empty".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be non-zero".into(),
            ));
        }
        if tree_contains(Path::new(&self.dist_dir), Path::new(&self.app_dir)) {
            return Err(ConfigError::Validation(format!(
                "dist_dir '{}' must not be or contain app_dir '{}'",
                self.dist_dir, self.app_dir
            )));
        }
        Ok(())
    }
}

/// Lexically normalize a path: drop `.` and fold `name/..` pairs.
/// Leading `..` components are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether deleting `outer` would delete `inner` (equal, or an ancestor of it).
/// An empty `outer` is the base directory itself and contains everything.
pub fn tree_contains(outer: &Path, inner: &Path) -> bool {
    let outer = normalize_path(outer);
    if outer.has_root() && outer.parent().is_none() {
        return true;
    }
    normalize_path(inner).starts_with(&outer)
}

/// Stylesheet task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Entry stylesheet patterns. Normally a single file.
    pub entry: Vec<String>,
    /// Output file, relative to the working tree.
    pub output: String,
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
    /// Patterns that re-run the task in develop mode.
    pub watch: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entry: vec!["scss/main.scss".to_string()],
            output: "css/style.min.css".to_string(),
            browsers: vec!["last 10 versions".to_string()],
            watch: vec!["scss/**/*.scss".to_string()],
        }
    }
}

/// Script bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Entry scripts, concatenated in the listed order.
    pub entries: Vec<String>,
    pub output: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            entries: vec!["js/main.js".to_string()],
            output: "js/main.min.js".to_string(),
        }
    }
}

/// Image conversion and compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub sources: Vec<String>,
    /// Directory receiving every derived file.
    pub dest: String,
    /// Produce a `.webp` sibling for each raster source.
    pub webp: bool,
    /// Produce an `.avif` sibling for each raster source.
    pub avif: bool,
    /// Lossy encoding quality (0 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            sources: vec!["images/src/*.*".to_string()],
            dest: "images".to_string(),
            webp: true,
            avif: false,
            quality: 80,
        }
    }
}

/// Font conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    pub sources: Vec<String>,
    pub dest: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            sources: vec!["fonts/src/*.ttf".to_string()],
            dest: "fonts".to_string(),
        }
    }
}

/// SVG sprite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub sources: Vec<String>,
    pub output: String,
    /// Preview document listing every icon. Empty string disables it.
    pub example: String,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            sources: vec!["images/*.svg".to_string(), "!images/sprite.svg".to_string()],
            output: "images/sprite.svg".to_string(),
            example: "images/stack/sprite.stack.html".to_string(),
        }
    }
}

/// Page templating settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    pub sources: Vec<String>,
    /// Directory searched for include fragments.
    pub components: String,
    /// Directory receiving finished pages.
    pub dest: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            sources: vec!["pages/*.html".to_string()],
            components: "components".to_string(),
            dest: ".".to_string(),
        }
    }
}

/// Production packaging allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Ordered patterns; a later pattern wins over an earlier one.
    pub patterns: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            patterns: [
                "css/style.min.css",
                "images/*.*",
                "!images/*.svg",
                "images/sprite.svg",
                "fonts/*.*",
                "js/main.min.js",
                "**/*.html",
                "!pages/**",
                "!components/**",
                "!images/**/*.html",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PipelineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or from `<project>/siteforge.toml` when `path` is `None`.
pub fn load_config(project: &Path, path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project.join(CONFIG_FILENAME));
    resolve_config(load_raw_config(&path)?)
}

/// Resolved project locations: the configuration plus absolute roots.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: PipelineConfig,
    /// Working tree every task reads from and writes into.
    pub app_root: PathBuf,
    /// Output tree written by the package task.
    pub dist_root: PathBuf,
}

impl Project {
    pub fn new(project_dir: &Path, config: PipelineConfig) -> Self {
        Self {
            app_root: project_dir.join(&config.app_dir),
            dist_root: project_dir.join(&config.dist_dir),
            config,
        }
    }

    /// Resolve a working-tree relative path.
    pub fn app_path(&self, relative: &str) -> PathBuf {
        if relative == "." || relative.is_empty() {
            self.app_root.clone()
        } else {
            self.app_root.join(relative)
        }
    }
}

/// Returns a fully-commented stock `siteforge.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# siteforge configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Paths inside sections are relative to app_dir.
# Patterns: `*` stays inside one directory, `**` spans directories,
# a leading `!` excludes, and the last matching pattern wins.
# Unknown keys will cause an error.

# Working tree, relative to the project directory.
app_dir = "app"

# Output tree written by `siteforge build`.
dist_dir = "dist"

# ---------------------------------------------------------------------------
# Stylesheet: compile -> vendor prefix -> minify
# ---------------------------------------------------------------------------
[styles]
entry = ["scss/main.scss"]
output = "css/style.min.css"
# Browserslist queries for vendor prefixing.
browsers = ["last 10 versions"]
# Changes to these files re-run the task in develop mode.
watch = ["scss/**/*.scss"]

# ---------------------------------------------------------------------------
# Scripts: concatenated in listed order, then minified
# ---------------------------------------------------------------------------
[scripts]
entries = ["js/main.js"]
output = "js/main.min.js"

# ---------------------------------------------------------------------------
# Images: next-gen siblings plus a re-compressed copy of every source
# ---------------------------------------------------------------------------
[images]
sources = ["images/src/*.*"]
dest = "images"
webp = true
avif = false
# Lossy encoding quality (0 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Fonts: TrueType -> WOFF2
# ---------------------------------------------------------------------------
[fonts]
sources = ["fonts/src/*.ttf"]
dest = "fonts"

# ---------------------------------------------------------------------------
# SVG sprite (stack mode)
# ---------------------------------------------------------------------------
[sprite]
sources = ["images/*.svg", "!images/sprite.svg"]
output = "images/sprite.svg"
# Preview document; set to "" to disable.
example = "images/stack/sprite.stack.html"

# ---------------------------------------------------------------------------
# Pages: resolve include directives against the components directory
# ---------------------------------------------------------------------------
[pages]
sources = ["pages/*.html"]
components = "components"
dest = "."

# ---------------------------------------------------------------------------
# Package: allow-list copied into dist_dir by `siteforge build`
# ---------------------------------------------------------------------------
[package]
patterns = [
    "css/style.min.css",
    "images/*.*",
    "!images/*.svg",
    "images/sprite.svg",
    "fonts/*.*",
    "js/main.min.js",
    "**/*.html",
    # Page templates and include fragments are sources, not artifacts.
    "!pages/**",
    "!components/**",
    "!images/**/*.html",
]

# ---------------------------------------------------------------------------
# Development server
# ---------------------------------------------------------------------------
[server]
host = "127.0.0.1"
port = 3000

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_reproduces_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.app_dir, "app");
        assert_eq!(config.dist_dir, "dist");
        assert_eq!(config.styles.output, "css/style.min.css");
        assert_eq!(config.scripts.output, "js/main.min.js");
        assert_eq!(config.images.dest, "images");
        assert_eq!(config.sprite.output, "images/sprite.svg");
        assert_eq!(config.pages.dest, ".");
    }

    #[test]
    fn default_package_patterns_end_with_image_html_exclusion() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.package.patterns.last().map(String::as_str),
            Some("!images/**/*.html")
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[images]
avif = true
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert!(config.images.avif);
        // Defaults preserved
        assert!(config.images.webp);
        assert_eq!(config.images.quality, 80);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.scripts.entries, vec!["js/main.js"]);
    }

    #[test]
    fn load_config_reads_project_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
app_dir = "src"

[scripts]
entries = ["js/vendor.js", "js/main.js"]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.app_dir, "src");
        assert_eq!(config.scripts.entries, vec!["js/vendor.js", "js/main.js"]);
        assert_eq!(config.scripts.output, "js/main.min.js");
    }

    #[test]
    fn load_config_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let config = load_config(tmp.path(), Some(&path)).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[images]
qualty = 90
"#;
        let result: Result<PipelineConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<PipelineConfig, _> = toml::from_str("[imagez]\nquality = 90\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[images]
webp = true
quality = 80
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[images]\nquality = 60\n").unwrap();
        let merged = merge_toml(base, overlay);
        let images = merged.get("images").unwrap();
        assert_eq!(images.get("quality").unwrap().as_integer(), Some(60));
        assert_eq!(images.get("webp").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn merge_toml_arrays_replace_rather_than_append() {
        let base: toml::Value = toml::from_str(r#"patterns = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"patterns = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("patterns").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_too_high() {
        let mut config = PipelineConfig::default();
        config.images.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_empty_script_entries() {
        let mut config = PipelineConfig::default();
        config.scripts.entries.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_same_app_and_dist() {
        let mut config = PipelineConfig::default();
        config.dist_dir = "app".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_dist_must_not_contain_app() {
        for dist in ["", ".", "./", "./app", "app/", "app/../app", "x/..", "/"] {
            let mut config = PipelineConfig::default();
            config.dist_dir = dist.to_string();
            assert!(config.validate().is_err(), "dist_dir '{dist}' accepted");
        }

        let mut config = PipelineConfig::default();
        config.app_dir = "site/app".to_string();
        config.dist_dir = "site".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_allows_sibling_and_nested_dist() {
        for dist in ["dist", "../out", "build/dist", "app-dist", "app/dist"] {
            let mut config = PipelineConfig::default();
            config.dist_dir = dist.to_string();
            assert!(config.validate().is_ok(), "dist_dir '{dist}' rejected");
        }
    }

    #[test]
    fn resolve_config_rejects_empty_dist_dir() {
        let overlay: toml::Value = toml::from_str("dist_dir = \"\"\n").unwrap();
        let result = resolve_config(Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn normalize_path_folds_dots() {
        assert_eq!(normalize_path(Path::new("./a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::new());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[server]\nport = 0\n").unwrap();
        let result = resolve_config(Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    // =========================================================================
    // Project paths
    // =========================================================================

    #[test]
    fn project_resolves_roots() {
        let project = Project::new(Path::new("/site"), PipelineConfig::default());
        assert_eq!(project.app_root, Path::new("/site/app"));
        assert_eq!(project.dist_root, Path::new("/site/dist"));
        assert_eq!(project.app_path("."), Path::new("/site/app"));
        assert_eq!(project.app_path("css"), Path::new("/site/app/css"));
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: PipelineConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = PipelineConfig::default();
        assert_eq!(config.package.patterns, defaults.package.patterns);
        assert_eq!(config.sprite.sources, defaults.sprite.sources);
        assert_eq!(config.styles.browsers, defaults.styles.browsers);
        assert_eq!(config.images.quality, defaults.images.quality);
        assert_eq!(config.server.port, defaults.server.port);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        for section in [
            "styles", "scripts", "images", "fonts", "sprite", "pages", "package", "server",
            "processing",
        ] {
            assert!(val.get(section).is_some(), "missing section {section}");
        }
    }
}
