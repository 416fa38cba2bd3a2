//! Shared types used across the scan and generate stages.
//!
//! Paths between stages are `/`-separated strings relative to the source
//! root, so the scan manifest serializes the same way on every platform.

use crate::config::SiteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the build does with a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Template: includes resolved, HTML-minified, listed in the sitemap.
    Page,
    /// `.css`: minified and written.
    Stylesheet,
    /// Include-only file, never written.
    Partial,
    /// Copied byte for byte.
    Asset,
}

impl FileKind {
    /// Classify a file by its extension (case-insensitive).
    pub fn classify(path: &Path, config: &SiteConfig) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if config.is_page_extension(&ext) {
            FileKind::Page
        } else if config.is_partial_extension(&ext) {
            FileKind::Partial
        } else if ext == "css" {
            FileKind::Stylesheet
        } else {
            FileKind::Asset
        }
    }
}

/// Render `path` relative to `root` with `/` separators.
///
/// Returns `None` if `path` is not under `root`.
pub fn site_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
