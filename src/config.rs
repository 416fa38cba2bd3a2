//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file, if any, is merged on top
//! of it key by key, so config files only need the values they change.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml        # Optional; never copied to the output
//! ├── index.html
//! └── _includes/
//!     └── header.inc
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = "https://example.com"   # Prefix for sitemap URLs
//!
//! [pages]
//! extensions = ["html", "htm", "shtml"]  # Templates that get includes resolved
//!
//! [includes]
//! partial_extensions = ["inc"]  # Include-only files, never emitted
//! strict = false                # Fail the build on any broken include
//!
//! [minify]
//! html = true
//! css = true
//!
//! [assets]
//! exclude = ["_includes", "node_modules"]  # Directory names never walked
//!
//! [sitemap]
//! enabled = true
//! filename = "sitemap.xml"
//! exclude = ["404.html"]
//!
//! [processing]
//! max_processes = 4   # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the config file looked up in the source root.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute URL the site is published under. Used for sitemap entries.
    pub base_url: String,
    /// Which files are page templates.
    pub pages: PagesConfig,
    /// Include resolution settings.
    pub includes: IncludesConfig,
    /// Minification toggles.
    pub minify: MinifyConfig,
    /// Static asset settings.
    pub assets: AssetsConfig,
    /// Sitemap emission settings.
    pub sitemap: SitemapConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            pages: PagesConfig::default(),
            includes: IncludesConfig::default(),
            minify: MinifyConfig::default(),
            assets: AssetsConfig::default(),
            sitemap: SitemapConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.pages.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "pages.extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .pages
            .extensions
            .iter()
            .find(|e| contains_ignore_case(&self.includes.partial_extensions, e))
        {
            return Err(ConfigError::Validation(format!(
                "extension '{ext}' is listed as both a page and a partial"
            )));
        }
        if self.sitemap.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sitemap.filename must not be empty".into(),
            ));
        }
        if Path::new(&self.sitemap.filename)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ConfigError::Validation(format!(
                "sitemap.filename must be a relative path inside the output directory: {}",
                self.sitemap.filename
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// True if `ext` (without the dot) names a page template.
    pub fn is_page_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.pages.extensions, ext)
    }

    /// True if `ext` (without the dot) names an include-only partial.
    pub fn is_partial_extension(&self, ext: &str) -> bool {
        contains_ignore_case(&self.includes.partial_extensions, ext)
    }
}

fn contains_ignore_case(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Page template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// File extensions treated as templates (includes resolved, HTML-minified).
    pub extensions: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".into(), "htm".into(), "shtml".into()],
        }
    }
}

/// Include resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludesConfig {
    /// Extensions of include-only files. They are read through directives
    /// but never copied to the output.
    pub partial_extensions: Vec<String>,
    /// When true, any missing or cyclic include fails the build instead of
    /// leaving a marker in the page.
    pub strict: bool,
}

impl Default for IncludesConfig {
    fn default() -> Self {
        Self {
            partial_extensions: vec!["inc".into()],
            strict: false,
        }
    }
}

/// Minification toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    pub html: bool,
    pub css: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            html: true,
            css: true,
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory names skipped entirely while walking the source tree.
    /// Hidden entries (leading `.`) are always skipped.
    pub exclude: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["_includes".into(), "node_modules".into()],
        }
    }
}

/// Sitemap emission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    pub enabled: bool,
    /// Output filename, relative to the output root.
    pub filename: String,
    /// Page paths (relative to the source root) left out of the sitemap.
    pub exclude: Vec<String>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filename: "sitemap.xml".to_string(),
            exclude: vec!["404.html".into()],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel page workers.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, falling back to
/// stock defaults when the file is absent.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ssi-site Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Absolute URL the site is published under. Sitemap entries are built
# from it.
base_url = "https://example.com"

# ---------------------------------------------------------------------------
# Page templates
# ---------------------------------------------------------------------------
[pages]
# Files with these extensions have <!--#include virtual="..." --> directives
# resolved and are HTML-minified.
extensions = ["html", "htm", "shtml"]

# ---------------------------------------------------------------------------
# Includes
# ---------------------------------------------------------------------------
[includes]
# Include-only files. They can be included but are never copied to output.
partial_extensions = ["inc"]

# Broken includes normally leave a marker in the page:
#   <!-- missing-include:path -->  or  <!-- cyclic-include:path -->
# Set to true to fail the build instead.
strict = false

# ---------------------------------------------------------------------------
# Minification
# ---------------------------------------------------------------------------
[minify]
html = true
css = true

# ---------------------------------------------------------------------------
# Static assets
# ---------------------------------------------------------------------------
[assets]
# Directory names that are never walked. Hidden files and directories
# (leading ".") are always skipped.
exclude = ["_includes", "node_modules"]

# ---------------------------------------------------------------------------
# Sitemap
# ---------------------------------------------------------------------------
[sitemap]
enabled = true
filename = "sitemap.xml"
# Page paths (relative to the source root) left out of the sitemap.
exclude = ["404.html"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
