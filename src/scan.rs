//! Source tree scanning and manifest generation.
//!
//! Stage 1 of the build. Walks the source directory and sorts every file
//! into one of four buckets, producing a [`Manifest`] the generate stage
//! consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! site/                        # Source root
//! ├── config.toml              # Site configuration (optional, never emitted)
//! ├── index.html               # Page
//! ├── about/
//! │   ├── index.html           # Page
//! │   └── team.inc             # Partial, included by about/index.html
//! ├── _includes/               # Excluded directory: only reachable via includes
//! │   ├── header.inc
//! │   └── footer.inc
//! ├── css/
//! │   └── site.css             # Stylesheet
//! ├── robots.txt               # Asset
//! └── .drafts/                 # Hidden: skipped
//! ```
//!
//! ## Rules
//!
//! - Hidden entries (leading `.`) are skipped, files and directories alike.
//! - Directories named in `assets.exclude` are not walked.
//! - The root `config.toml` is configuration, not content.
//! - Everything is listed in file-name order so builds are reproducible.

use crate::config::{self, CONFIG_FILENAME, SiteConfig};
use crate::types::{FileKind, site_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Source is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Manifest output from the scan stage.
///
/// All paths are relative to the source root, `/`-separated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub pages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stylesheets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
    pub config: SiteConfig,
}

impl Manifest {
    /// Every file the generate stage writes, in manifest order.
    pub fn emitted_files(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .chain(&self.stylesheets)
            .chain(&self.assets)
            .map(String::as_str)
    }
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let config = config::load_config(root)?;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e, &config));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 || !entry.path().is_file() {
            continue;
        }
        let Some(rel) = site_path(root, entry.path()) else {
            continue;
        };
        if rel == CONFIG_FILENAME {
            continue;
        }
        found.push((FileKind::classify(entry.path(), &config), rel));
    }

    let mut manifest = Manifest {
        pages: Vec::new(),
        stylesheets: Vec::new(),
        partials: Vec::new(),
        assets: Vec::new(),
        config,
    };
    for (kind, rel) in found {
        match kind {
            FileKind::Page => manifest.pages.push(rel),
            FileKind::Stylesheet => manifest.stylesheets.push(rel),
            FileKind::Partial => manifest.partials.push(rel),
            FileKind::Asset => manifest.assets.push(rel),
        }
    }

    Ok(manifest)
}

fn is_skipped(entry: &DirEntry, config: &SiteConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && config.assets.exclude.iter().any(|ex| *ex == *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn scan_classifies_fixture_files() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        assert_eq!(
            manifest.pages,
            vec!["404.html", "about/index.html", "blog/first-post.html", "index.html"]
        );
        assert_eq!(manifest.stylesheets, vec!["css/site.css"]);
        assert_eq!(manifest.partials, vec!["about/team.inc"]);
        assert!(manifest.assets.contains(&"robots.txt".to_string()));
        assert!(manifest.assets.contains(&"img/logo.svg".to_string()));
    }

    #[test]
    fn scan_reads_config() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.config.base_url, "https://ssi.example.org");
    }

    #[test]
    fn config_file_is_not_an_asset() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(!manifest.emitted_files().any(|f| f == "config.toml"));
    }

    #[test]
    fn excluded_directories_are_not_walked() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(
            !manifest
                .partials
                .iter()
                .chain(&manifest.assets)
                .any(|p| p.starts_with("_includes/"))
        );
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "index.html", "hi");
        write_file(tmp.path(), ".draft.html", "wip");
        write_file(tmp.path(), ".git/HEAD", "ref");
        write_file(tmp.path(), "docs/.notes/n.html", "n");

        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.pages, vec!["index.html"]);
        assert!(manifest.assets.is_empty());
    }

    #[test]
    fn nested_config_toml_is_an_asset() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "tools/config.toml", "x = 1");

        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.assets, vec!["tools/config.toml"]);
    }

    #[test]
    fn exclude_list_comes_from_config() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "config.toml", "[assets]\nexclude = [\"drafts\"]\n");
        write_file(tmp.path(), "drafts/a.html", "a");
        write_file(tmp.path(), "_includes/h.inc", "h");

        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.pages.is_empty());
        // _includes is no longer excluded once the list is overridden
        assert_eq!(manifest.partials, vec!["_includes/h.inc"]);
    }

    #[test]
    fn excluded_name_only_matches_directories() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "node_modules", "a file, not a directory");

        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.assets, vec!["node_modules"]);
    }

    #[test]
    fn scan_rejects_missing_root() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn scan_surfaces_config_errors() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "config.toml", "base_url = \"ftp://x\"\n");
        assert!(matches!(scan(tmp.path()), Err(ScanError::Config(_))));
    }

    #[test]
    fn manifest_serializes_to_json() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages, manifest.pages);
        assert_eq!(back.config.base_url, manifest.config.base_url);
    }
}
