//! Server-side include resolution.
//!
//! Expands `<!--#include virtual="PATH" -->` directives depth-first. The
//! directive syntax is matched exactly; anything else (including other SSI
//! commands like `#echo`) passes through untouched.
//!
//! ## Path Rules
//!
//! ```text
//! <!--#include virtual="/_includes/header.inc" -->   # from the project root
//! <!--#include virtual="nav.inc" -->                 # from the including file's directory
//! ```
//!
//! A nested include resolves against the directory of the file that contains
//! it, not the top-level page. So `blog/index.html` including `parts/a.inc`,
//! which includes `b.inc`, reads `blog/parts/b.inc`.
//!
//! ## Failure Markers
//!
//! Resolution never fails because of a single directive. Instead the
//! directive is replaced with a comment that is easy to grep for in the
//! output:
//!
//! ```text
//! <!-- missing-include:nav.inc -->      # unreadable: absent, permissions, not UTF-8
//! <!-- cyclic-include:/page.html -->    # target is already being expanded
//! ```
//!
//! Only ancestors count as cycles. The same partial included twice side by
//! side expands twice.
//!
//! ## Single Pass
//!
//! Each document is scanned once, left to right. Included text is already
//! fully resolved when it is spliced in, and the outer buffer is never
//! re-scanned afterwards.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!--#include virtual="([^"]*)" -->"#).expect("directive pattern must compile")
});

#[derive(Error, Debug)]
pub enum IncludeError {
    /// The top-level document itself could not be read. Nested reads never
    /// produce this; they become markers.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a directive was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    Cyclic,
}

impl IssueKind {
    /// The in-band replacement for a directive with this problem.
    pub fn marker(self, raw_path: &str) -> String {
        match self {
            IssueKind::Missing => format!("<!-- missing-include:{raw_path} -->"),
            IssueKind::Cyclic => format!("<!-- cyclic-include:{raw_path} -->"),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Missing => f.write_str("missing"),
            IssueKind::Cyclic => f.write_str("cyclic"),
        }
    }
}

/// One directive that was replaced by a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeIssue {
    pub kind: IssueKind,
    /// Path text exactly as written in the directive.
    pub raw_path: String,
    /// Directory the directive was resolved from.
    pub base_dir: PathBuf,
}

/// Fully expanded text plus every directive that could not be expanded.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub text: String,
    pub issues: Vec<IncludeIssue>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Resolves include directives against a fixed project root.
///
/// Holds no per-document state, so one resolver can be shared across
/// threads; every call owns its own visited set.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    root: PathBuf,
}

impl IncludeResolver {
    /// Create a resolver for `root`. Relative roots are made absolute
    /// against the current directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_path(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand every directive in `content`.
    ///
    /// `visited` holds the normalized paths currently being expanded on the
    /// ancestor chain; it is left as it was found when this returns.
    pub fn resolve(&self, content: &str, base_dir: &Path, visited: &mut HashSet<PathBuf>) -> String {
        self.resolve_with_issues(content, base_dir, visited).text
    }

    /// Like [`resolve`](Self::resolve), also reporting every marker inserted.
    pub fn resolve_with_issues(
        &self,
        content: &str,
        base_dir: &Path,
        visited: &mut HashSet<PathBuf>,
    ) -> Resolution {
        let mut issues = Vec::new();
        let text = self.expand(content, &normalize_path(base_dir), visited, &mut issues);
        Resolution { text, issues }
    }

    /// Read a top-level document and expand it.
    ///
    /// The document's own path is seeded into the visited set, so a partial
    /// that includes the page back is reported as cyclic rather than
    /// expanding the page a second time.
    pub fn resolve_file(&self, path: &Path) -> Result<Resolution, IncludeError> {
        let path = normalize_path(path);
        let content = fs::read_to_string(&path).map_err(|source| IncludeError::Read {
            path: path.clone(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(&self.root).to_path_buf();

        let mut visited = HashSet::from([path]);
        Ok(self.resolve_with_issues(&content, &base_dir, &mut visited))
    }

    /// Where a raw directive path points, before normalization.
    fn candidate(&self, raw: &str, base_dir: &Path) -> PathBuf {
        if raw.starts_with('/') {
            // Joining an absolute path would replace the root entirely.
            self.root.join(raw.trim_start_matches('/'))
        } else {
            base_dir.join(raw)
        }
    }

    fn expand(
        &self,
        content: &str,
        base_dir: &Path,
        visited: &mut HashSet<PathBuf>,
        issues: &mut Vec<IncludeIssue>,
    ) -> String {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in DIRECTIVE.captures_iter(content) {
            let (Some(whole), Some(raw)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let raw = raw.as_str();
            out.push_str(&content[last..whole.start()]);
            last = whole.end();

            let target = normalize_path(&self.candidate(raw, base_dir));

            if visited.contains(&target) {
                out.push_str(&self.issue(IssueKind::Cyclic, raw, base_dir, issues));
                continue;
            }

            let Ok(included) = fs::read_to_string(&target) else {
                out.push_str(&self.issue(IssueKind::Missing, raw, base_dir, issues));
                continue;
            };

            let child_dir = target.parent().unwrap_or(&self.root).to_path_buf();
            visited.insert(target.clone());
            let expanded = self.expand(&included, &child_dir, visited, issues);
            visited.remove(&target);

            out.push_str(&expanded);
        }

        out.push_str(&content[last..]);
        out
    }

    fn issue(
        &self,
        kind: IssueKind,
        raw: &str,
        base_dir: &Path,
        issues: &mut Vec<IncludeIssue>,
    ) -> String {
        issues.push(IncludeIssue {
            kind,
            raw_path: raw.to_string(),
            base_dir: base_dir.to_path_buf(),
        });
        kind.marker(raw)
    }
}

/// Lexically normalize a path to an absolute form.
///
/// `.` segments are dropped and `..` pops the previous segment (never past
/// the filesystem root). Symlinks are not followed and the path need not
/// exist.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
