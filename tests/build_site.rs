//! End-to-end build of the fixture site through the public API.
//!
//! Reads `fixtures/site/` in place and writes into a temp directory, so the
//! fixtures are never modified.

use ssi_site::generate::{GenerateError, generate, render_pages};
use ssi_site::include::{IncludeResolver, IssueKind};
use ssi_site::scan::scan;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn fixture_site_builds() {
    let source = fixture_root();
    let out = TempDir::new().unwrap();
    let manifest = scan(&source).unwrap();

    let report = generate(&manifest, &source, out.path()).unwrap();

    let mut written: Vec<String> = walk(out.path());
    written.sort();
    assert_eq!(
        written,
        vec![
            "404.html",
            "about/index.html",
            "blog/first-post.html",
            "css/site.css",
            "img/logo.svg",
            "index.html",
            "robots.txt",
            "sitemap.xml",
        ]
    );
    assert_eq!(report.issue_count(), 1);
}

#[test]
fn nested_partials_resolve_from_their_own_directory() {
    let source = fixture_root();
    let out = TempDir::new().unwrap();
    let manifest = scan(&source).unwrap();
    generate(&manifest, &source, out.path()).unwrap();

    // header.inc and footer.inc both pull in _includes/nav.inc by a
    // relative path, from pages at different depths.
    for page in ["index.html", "about/index.html", "blog/first-post.html"] {
        let html = fs::read_to_string(out.path().join(page)).unwrap();
        assert_eq!(html.matches("/about/").count(), 2, "{page}: nav in header and footer");
        assert!(!html.contains("#include"), "{page}: directive left behind");
    }

    let about = fs::read_to_string(out.path().join("about/index.html")).unwrap();
    assert!(about.contains("Grace"));
}

#[test]
fn broken_include_is_visible_in_output() {
    let source = fixture_root();
    let out = TempDir::new().unwrap();
    let manifest = scan(&source).unwrap();
    generate(&manifest, &source, out.path()).unwrap();

    let post = fs::read_to_string(out.path().join("blog/first-post.html")).unwrap();
    assert!(post.contains("missing-include:related.inc"));
    assert!(post.contains("Hello from the blog."));
}

#[test]
fn check_reports_without_writing() {
    let source = fixture_root();
    let manifest = scan(&source).unwrap();

    let pages = render_pages(&manifest, &source).unwrap();
    let broken: Vec<_> = pages.iter().filter(|p| !p.issues.is_empty()).collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].path, "blog/first-post.html");
    assert_eq!(broken[0].issues[0].kind, IssueKind::Missing);
}

#[test]
fn strict_build_fails() {
    let source = fixture_root();
    let out = TempDir::new().unwrap();
    let mut manifest = scan(&source).unwrap();
    manifest.config.includes.strict = true;

    let err = generate(&manifest, &source, &out.path().join("dist")).unwrap_err();
    assert!(matches!(err, GenerateError::BrokenIncludes { .. }));
    assert!(err.to_string().contains("1 broken include"));
}

#[test]
fn cyclic_pages_still_build() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(source.path(), "a.html", "<p>A</p><!--#include virtual=\"b.html\" -->");
    write(source.path(), "b.html", "<p>B</p><!--#include virtual=\"a.html\" -->");
    let manifest = scan(source.path()).unwrap();

    let report = generate(&manifest, source.path(), out.path()).unwrap();
    assert_eq!(report.issue_count(), 2);

    let a = fs::read_to_string(out.path().join("a.html")).unwrap();
    assert!(a.contains("cyclic-include:a.html"));
    let b = fs::read_to_string(out.path().join("b.html")).unwrap();
    assert!(b.contains("cyclic-include:b.html"));
}

#[test]
fn resolver_public_contract() {
    let root = TempDir::new().unwrap();
    write(root.path(), "pages/partial.inc", "[<!--#include virtual=\"sub/x.inc\" -->]");
    write(root.path(), "pages/sub/x.inc", "x");

    let resolver = IncludeResolver::new(root.path());
    let mut visited = HashSet::new();
    let text = resolver.resolve(
        "<!--#include virtual=\"partial.inc\" --><!--#include virtual=\"/pages/partial.inc\" -->",
        &root.path().join("pages"),
        &mut visited,
    );

    assert_eq!(text, "[x][x]");
    assert!(visited.is_empty());
}

fn walk(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
                files.push(parts.join("/"));
            }
        }
    }
    files
}
