//! Sitemap emission.
//!
//! Produces a [sitemaps.org](https://www.sitemaps.org/protocol.html) document
//! listing every emitted page. Markup is built with Maud so URLs are escaped
//! the same way page content would be.
//!
//! ```text
//! index.html            → https://example.com/
//! blog/index.html       → https://example.com/blog/
//! blog/first-post.html  → https://example.com/blog/first-post.html
//! ```

use maud::{PreEscaped, html};

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// File names served as their directory's URL.
const INDEX_FILES: &[&str] = &["index.html", "index.htm", "index.shtml"];

/// Absolute URL for a page at `rel_path` (relative to the site root).
pub fn page_url(base_url: &str, rel_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let rel = rel_path.trim_start_matches('/');

    let path = match rel.rsplit_once('/') {
        Some((dir, file)) if INDEX_FILES.contains(&file) => format!("{dir}/"),
        None if INDEX_FILES.contains(&rel) => String::new(),
        _ => rel.to_string(),
    };

    format!("{base}/{}", encode_path(&path))
}

/// Percent-encode everything outside RFC 3986 unreserved characters and `/`.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Render the sitemap for `pages`, sorted and de-duplicated by URL.
pub fn render_sitemap<S: AsRef<str>>(base_url: &str, pages: &[S]) -> String {
    let mut urls: Vec<String> = pages
        .iter()
        .map(|p| page_url(base_url, p.as_ref()))
        .collect();
    urls.sort();
    urls.dedup();

    html! {
        (PreEscaped(XML_DECLARATION))
        urlset xmlns=(SITEMAP_NAMESPACE) {
            @for loc_url in &urls {
                url { loc { (loc_url) } }
            }
        }
    }
    .into_string()
}
