//! # ssi-site
//!
//! A small static site generator for hand-written HTML. Pages share markup
//! through server-side include directives that are expanded at build time,
//! so the published site is plain static files.
//!
//! ```html
//! <!--#include virtual="/_includes/header.inc" -->
//! <main>...</main>
//! <!--#include virtual="footer.inc" -->
//! ```
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      site/     →  Manifest        (filesystem → classified file lists)
//! 2. Generate  Manifest  →  dist/           (resolve, minify, copy, sitemap)
//! ```
//!
//! The manifest is plain serde data, so `ssi-site scan` can dump it as JSON
//! for inspection, and the generate stage can be tested against hand-built
//! manifests without walking a tree.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the source tree, classifies files, loads config |
//! | [`generate`] | Stage 2: renders pages in parallel, writes the output tree |
//! | [`include`] | Depth-first include resolution with cycle detection |
//! | [`minify`] | HTML and CSS minification |
//! | [`sitemap`] | sitemaps.org XML from the page list |
//! | [`config`] | `config.toml` loading, defaults, validation |
//! | [`types`] | File classification and path helpers shared by both stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Broken Includes Never Break the Build
//!
//! A missing or cyclic include is replaced by a comment such as
//! `<!-- missing-include:nav.inc -->` and the build carries on. One bad
//! partial should not take down unrelated pages; the markers are easy to
//! find with `grep -r missing-include dist/`. Strict mode
//! (`includes.strict = true` or `build --strict`) turns them into a build
//! failure instead.
//!
//! ## Cycle Detection by Ancestry
//!
//! The resolver tracks the files currently being expanded, not every file
//! seen. A footer included by both the header and the body expands twice;
//! only a file that (directly or indirectly) includes itself is a cycle.
//! Paths are compared after lexical normalization, so `a/../b.inc` and
//! `/b.inc` are the same file.
//!
//! ## No Cache
//!
//! Every page re-reads its partials from disk. Sites built this way are
//! small, and the pages render in parallel.

pub mod config;
pub mod generate;
pub mod include;
pub mod minify;
pub mod output;
pub mod scan;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
