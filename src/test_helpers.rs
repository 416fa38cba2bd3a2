//! Shared test utilities for the ssi-site test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! write_file(tmp.path(), "extra/page.html", "<!--#include virtual=\"/_includes/footer.inc\" -->");
//! let manifest = scan(tmp.path()).unwrap();
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::generate::{BuildReport, PageReport};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

// =========================================================================
// Report lookups — panics with a clear message on miss
// =========================================================================

/// Find a page in a build report by path. Panics if not found.
pub fn find_page_report<'a>(report: &'a BuildReport, path: &str) -> &'a PageReport {
    report
        .pages
        .iter()
        .find(|p| p.path == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = report.pages.iter().map(|p| p.path.as_str()).collect();
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}
