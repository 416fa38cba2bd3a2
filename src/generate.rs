//! Site generation.
//!
//! Stage 2 of the build. Takes the scan [`Manifest`] and writes the final
//! site:
//!
//! 1. **Pages** are resolved (includes expanded) and HTML-minified. Pages
//!    are independent, so they render in parallel on the rayon pool, each
//!    with its own visited set.
//! 2. **Stylesheets** are CSS-minified.
//! 3. **Assets** are copied byte for byte.
//! 4. **Sitemap** lists every page not excluded by config.
//!
//! ## Broken Includes
//!
//! By default a broken include leaves a marker in the page and the build
//! carries on; the [`BuildReport`] lists every marker so the CLI can show
//! them. With `includes.strict` the build stops before writing anything.
//!
//! ## Output Structure
//!
//! Output mirrors the source tree, minus partials and excluded directories:
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about/index.html
//! ├── css/site.css
//! ├── robots.txt
//! └── sitemap.xml
//! ```

use crate::include::{IncludeError, IncludeIssue, IncludeResolver, normalize_path};
use crate::minify::{minify_css, minify_html};
use crate::scan::Manifest;
use crate::sitemap;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Include error: {0}")]
    Include(#[from] IncludeError),
    #[error("{count} broken include(s) across {pages} page(s)")]
    BrokenIncludes { count: usize, pages: usize },
    #[error("Output directory must not be inside the source directory: {}", .0.display())]
    OutputInSource(PathBuf),
}

/// A page ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Path relative to the source (and output) root.
    pub path: String,
    pub html: String,
    pub issues: Vec<IncludeIssue>,
}

/// Per-page include problems, in manifest order.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub path: String,
    pub issues: Vec<IncludeIssue>,
}

/// What a build wrote.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub pages: Vec<PageReport>,
    pub stylesheets: usize,
    pub assets: usize,
    /// Sitemap path relative to the output root, if one was written.
    pub sitemap: Option<String>,
}

impl BuildReport {
    pub fn issue_count(&self) -> usize {
        self.pages.iter().map(|p| p.issues.len()).sum()
    }
}

/// Resolve and minify every page in the manifest.
///
/// Order follows `manifest.pages`. Only an unreadable page is an error;
/// broken includes inside it are recorded on the [`RenderedPage`].
pub fn render_pages(
    manifest: &Manifest,
    source: &Path,
) -> Result<Vec<RenderedPage>, GenerateError> {
    let resolver = IncludeResolver::new(source);
    let minify = manifest.config.minify.html;

    manifest
        .pages
        .par_iter()
        .map(|rel| -> Result<RenderedPage, GenerateError> {
            let resolution = resolver.resolve_file(&source.join(rel))?;
            let html = if minify {
                minify_html(&resolution.text)
            } else {
                resolution.text
            };
            Ok(RenderedPage {
                path: rel.clone(),
                html,
                issues: resolution.issues,
            })
        })
        .collect()
}

/// Count `(issues, pages with issues)`.
pub fn count_issues(pages: &[RenderedPage]) -> (usize, usize) {
    pages.iter().fold((0, 0), |(count, affected), page| {
        let n = page.issues.len();
        (count + n, affected + usize::from(n > 0))
    })
}

pub fn generate(
    manifest: &Manifest,
    source: &Path,
    output: &Path,
) -> Result<BuildReport, GenerateError> {
    let config = &manifest.config;

    // Output under the source would be scanned as site content next build.
    if normalize_path(output).starts_with(normalize_path(source)) {
        return Err(GenerateError::OutputInSource(output.to_path_buf()));
    }

    let rendered = render_pages(manifest, source)?;

    let (count, pages) = count_issues(&rendered);
    if config.includes.strict && count > 0 {
        return Err(GenerateError::BrokenIncludes { count, pages });
    }

    fs::create_dir_all(output)?;

    let mut report = BuildReport::default();
    for page in rendered {
        write_output(output, &page.path, page.html.as_bytes())?;
        report.pages.push(PageReport {
            path: page.path,
            issues: page.issues,
        });
    }

    for rel in &manifest.stylesheets {
        let css = fs::read_to_string(source.join(rel))?;
        let css = if config.minify.css {
            minify_css(&css)
        } else {
            css
        };
        write_output(output, rel, css.as_bytes())?;
        report.stylesheets += 1;
    }

    report.assets = copy_assets(manifest, source, output)?;

    if config.sitemap.enabled {
        let listed: Vec<&str> = manifest
            .pages
            .iter()
            .map(String::as_str)
            .filter(|p| !config.sitemap.exclude.iter().any(|ex| ex.as_str() == *p))
            .collect();
        let xml = sitemap::render_sitemap(&config.base_url, &listed);
        write_output(output, &config.sitemap.filename, xml.as_bytes())?;
        report.sitemap = Some(config.sitemap.filename.clone());
    }

    Ok(report)
}

/// Copy every manifest asset from `source` to the same relative path under
/// `output`. Returns the number of files copied.
pub fn copy_assets(manifest: &Manifest, source: &Path, output: &Path) -> std::io::Result<usize> {
    for rel in &manifest.assets {
        let dst = output.join(rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source.join(rel), &dst)?;
    }
    Ok(manifest.assets.len())
}

fn write_output(output: &Path, rel: &str, contents: &[u8]) -> std::io::Result<()> {
    let dst = output.join(rel);
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dst, contents)
}
