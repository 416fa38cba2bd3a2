//! CLI output formatting for the scan, check, and build commands.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Pages
//!     001 404.html
//!     002 about/index.html
//!     003 index.html
//!
//! Stylesheets
//!     css/site.css
//!
//! Partials
//!     about/team.inc
//!
//! Assets
//!     robots.txt
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 404.html
//! 002 blog/first-post.html
//!     missing: related.inc
//!         From: blog/
//! 003 index.html
//!
//! Stylesheets: 1 written
//! Assets: 2 copied
//! Sitemap → sitemap.xml
//! Built 3 pages, 1 broken include
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::CONFIG_FILENAME;
use crate::generate::{BuildReport, RenderedPage};
use crate::include::{IncludeIssue, normalize_path};
use crate::scan::Manifest;
use crate::types::site_path;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Two lines per issue: kind and raw path, then the directory it was
/// resolved from (relative to the source root when possible).
fn issue_lines(issue: &IncludeIssue, source_root: &Path, depth: usize) -> Vec<String> {
    let from = match site_path(&normalize_path(source_root), &issue.base_dir) {
        Some(rel) if rel.is_empty() => "./".to_string(),
        Some(rel) => format!("{rel}/"),
        None => issue.base_dir.display().to_string(),
    };
    vec![
        format!("{}{}: {}", indent(depth), issue.kind, issue.raw_path),
        format!("{}From: {}", indent(depth + 1), from),
    ]
}

fn page_lines<'a>(
    pages: impl Iterator<Item = (&'a str, &'a [IncludeIssue])>,
    source_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (path, issues)) in pages.enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), path));
        for issue in issues {
            lines.extend(issue_lines(issue, source_root, 1));
        }
    }
    lines
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan output: the inventory of what the build will do.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), page));
    }

    let sections = [
        ("Stylesheets", &manifest.stylesheets),
        ("Partials", &manifest.partials),
        ("Assets", &manifest.assets),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        for entry in entries {
            lines.push(format!("{}{}", indent(1), entry));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(CONFIG_FILENAME).exists() {
        lines.push(format!("{}{}", indent(1), CONFIG_FILENAME));
    } else {
        lines.push(format!("{}(defaults)", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output: every page with the includes it could not resolve.
pub fn format_check_output(pages: &[RenderedPage], source_root: &Path) -> Vec<String> {
    let mut lines = page_lines(
        pages.iter().map(|p| (p.path.as_str(), p.issues.as_slice())),
        source_root,
    );
    let issues: usize = pages.iter().map(|p| p.issues.len()).sum();
    lines.push(format!(
        "Checked {}, {}",
        plural(pages.len(), "page"),
        plural(issues, "broken include")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(pages: &[RenderedPage], source_root: &Path) {
    for line in format_check_output(pages, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: pages written, issues, and the remaining artifacts.
pub fn format_build_output(report: &BuildReport, source_root: &Path) -> Vec<String> {
    let mut lines = page_lines(
        report
            .pages
            .iter()
            .map(|p| (p.path.as_str(), p.issues.as_slice())),
        source_root,
    );

    lines.push(String::new());
    lines.push(format!("Stylesheets: {} written", report.stylesheets));
    lines.push(format!("Assets: {} copied", report.assets));
    if let Some(sitemap) = &report.sitemap {
        lines.push(format!("Sitemap \u{2192} {}", sitemap));
    }
    lines.push(format!(
        "Built {}, {}",
        plural(report.pages.len(), "page"),
        plural(report.issue_count(), "broken include")
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, source_root: &Path) {
    for line in format_build_output(report, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
