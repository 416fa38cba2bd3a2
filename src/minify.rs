//! HTML and CSS minification.
//!
//! Both functions are pure `text -> text` transforms with no knowledge of
//! includes. The output is smaller but equivalent markup; it is not meant to
//! match any other minifier byte for byte.
//!
//! HTML goes through [`minify_html`](https://docs.rs/minify-html) with
//! comments kept, so `missing-include` and `cyclic-include` markers survive
//! into the published page where they can be grepped for. Closing tags and
//! the `<html>`/`<head>` opening tags are kept as well.
//!
//! Standalone stylesheets use a small scanner instead: comments dropped,
//! whitespace collapsed, whitespace around `{ } ; , >` removed and the last
//! `;` of each block dropped. Quoted strings are copied verbatim.

use minify_html::Cfg;

/// Minify an HTML document, including inline `<style>` and `<script>`.
pub fn minify_html(html: &str) -> String {
    let mut cfg = Cfg::new();
    cfg.keep_comments = true;
    cfg.keep_ssi_comments = true;
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.minify_css = true;
    cfg.minify_js = true;

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8_lossy(&minified).into_owned()
}

/// No whitespace is needed after these.
fn tight_after(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>' | ':')
}

/// No whitespace is needed before these. `:` is absent on purpose:
/// `div :hover` and `div:hover` select different elements.
fn tight_before(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>')
}

/// Minify a standalone CSS stylesheet.
pub fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for inner in chars.by_ref() {
                if prev == '*' && inner == '/' {
                    break;
                }
                prev = inner;
            }
            pending_space = true;
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            if let Some(last) = out.chars().next_back() {
                if !tight_after(last) && !tight_before(c) {
                    out.push(' ');
                }
            }
            pending_space = false;
        }

        match c {
            '"' | '\'' => {
                out.push(c);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if inner == c {
                        break;
                    }
                }
            }
            '}' => {
                if out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
