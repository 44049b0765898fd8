//! Minimal HTML element lookup for merchant templates
//!
//! Templates are arbitrary merchant HTML, so this does not parse a document.
//! It finds the start tag carrying a given `id` and walks forward to the
//! matching end tag, counting nested tags of the same name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, invalid_structure};

/// Elements that never have an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Brace-delimited placeholder tokens such as `{quotestitle}`
pub(crate) static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[A-Za-z]+\}").expect("static token pattern"));

/// Byte offsets of an element inside a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    /// Start of the start tag
    pub start: usize,
    /// End of the start tag (exclusive)
    pub open_end: usize,
    /// Start of the end tag; equals `end` for void/self-closing elements
    pub close_start: usize,
    /// End of the end tag (exclusive)
    pub end: usize,
}

impl ElementSpan {
    /// Whether two spans share any bytes
    pub fn overlaps(&self, other: &ElementSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Outer HTML of the element
    pub fn outer<'a>(&self, html: &'a str) -> &'a str {
        &html[self.start..self.end]
    }
}

fn id_pattern(id: &str) -> Result<Regex> {
    let pattern = format!(
        r#"<([A-Za-z][A-Za-z0-9-]*)(?:\s[^>]*?)?\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    );
    Regex::new(&pattern).map_err(|e| invalid_structure(format!("bad element id '{}': {}", id, e)))
}

/// Find the first element whose `id` attribute equals `id`
///
/// Returns `Ok(None)` when no start tag carries the id and an
/// `InvalidStructure` error when the element is never closed.
pub fn find_element_by_id(html: &str, id: &str) -> Result<Option<ElementSpan>> {
    let open_re = id_pattern(id)?;
    let Some(caps) = open_re.captures(html) else {
        return Ok(None);
    };
    let whole = caps.get(0).expect("group 0 always present");
    let tag = caps[1].to_ascii_lowercase();

    if whole.as_str().ends_with("/>") || VOID_ELEMENTS.contains(&tag.as_str()) {
        return Ok(Some(ElementSpan {
            start: whole.start(),
            open_end: whole.end(),
            close_start: whole.end(),
            end: whole.end(),
        }));
    }

    let tag_re = Regex::new(&format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(&tag)))
        .map_err(|e| invalid_structure(format!("bad tag name '{}': {}", tag, e)))?;

    let mut depth = 1usize;
    for m in tag_re.captures_iter(&html[whole.end()..]) {
        let matched = m.get(0).expect("group 0 always present");
        let closing = !m[1].is_empty();
        if closing {
            depth -= 1;
            if depth == 0 {
                return Ok(Some(ElementSpan {
                    start: whole.start(),
                    open_end: whole.end(),
                    close_start: whole.end() + matched.start(),
                    end: whole.end() + matched.end(),
                }));
            }
        } else if !matched.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    Err(invalid_structure(format!(
        "element #{} (<{}>) is never closed",
        id, tag
    )))
}

/// Outer HTML of an element with its `id` attribute removed
pub fn outer_without_id(html: &str, span: &ElementSpan, id: &str) -> String {
    let open = &html[span.start..span.open_end];
    let attr = Regex::new(&format!(r#"\s+id\s*=\s*["']{}["']"#, regex::escape(id)))
        .map(|re| re.replace(open, "").into_owned())
        .unwrap_or_else(|_| open.to_string());
    format!("{}{}", attr, &html[span.open_end..span.end])
}

/// Whether the html contains a start tag carrying the id
pub fn has_element_id(html: &str, id: &str) -> bool {
    id_pattern(id).map(|re| re.is_match(html)).unwrap_or(false)
}

/// Whether a link target is an absolute `http` or `https` URL
pub fn is_web_url(url: &str) -> bool {
    match url.trim().split_once("://") {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_web_urls_are_links() {
        assert!(is_web_url("https://app.navilead.dk/o/1"));
        assert!(is_web_url(" HTTP://example.com"));
        assert!(!is_web_url("javascript:alert(1)"));
        assert!(!is_web_url("JavaScript://%0Aalert(1)"));
        assert!(!is_web_url("data:text/html,hi"));
        assert!(!is_web_url("/relative/path"));
        assert!(!is_web_url("https://"));
    }

    #[test]
    fn finds_nested_element() {
        let html = r#"<table><tr id="row"><td><tr>x</tr></td></tr><tr>after</tr></table>"#;
        let span = find_element_by_id(html, "row").unwrap().unwrap();
        assert_eq!(span.outer(html), r#"<tr id="row"><td><tr>x</tr></td></tr>"#);
    }

    #[test]
    fn accepts_single_quotes_and_other_attributes() {
        let html = r#"<div class="a" id='box' data-x="1">hi</div>"#;
        let span = find_element_by_id(html, "box").unwrap().unwrap();
        assert_eq!(&html[span.open_end..span.close_start], "hi");
    }

    #[test]
    fn ignores_prefixed_attributes() {
        let html = r#"<div data-id="box">no</div>"#;
        assert!(find_element_by_id(html, "box").unwrap().is_none());
        assert!(!has_element_id(html, "box"));
    }

    #[test]
    fn void_and_self_closing_elements() {
        let html = r#"<p>a<img id="logo" src="x.png">b<span id="s"/></p>"#;
        let img = find_element_by_id(html, "logo").unwrap().unwrap();
        assert_eq!(img.outer(html), r#"<img id="logo" src="x.png">"#);
        let span = find_element_by_id(html, "s").unwrap().unwrap();
        assert_eq!(span.outer(html), r#"<span id="s"/>"#);
    }

    #[test]
    fn unclosed_element_is_an_error() {
        assert!(find_element_by_id(r#"<div id="x"><div></div>"#, "x").is_err());
    }

    #[test]
    fn strips_id_from_clone() {
        let html = r#"<tr class="r" id="services-row"><td>1</td></tr>"#;
        let span = find_element_by_id(html, "services-row").unwrap().unwrap();
        assert_eq!(
            outer_without_id(html, &span, "services-row"),
            r#"<tr class="r"><td>1</td></tr>"#
        );
    }
}
