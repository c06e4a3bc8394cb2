//! Textual link extractor
//!
//! Scans raw bytes for URL-shaped text that no tag attribute carries:
//! `url(...)` references in CSS (stylesheets and inline styles) and bare
//! `//host/path` references in scripts, JSON, XML and plain text.
//!
//! Each match is handed to a link-boundary scanner. A quoted link runs to its
//! closing quote; an unquoted link runs until whitespace, a quote, or a
//! closing `}`, `)` or `>` met outside any bracket it opened itself.

use super::links::LinkSet;
use regex::bytes::Regex;
use std::sync::OnceLock;
use url::Url;

const CSS_URL_PATTERN: &str = r"(?i)url\s*\(\s*";
const DOUBLE_SLASH_PATTERN: &str = r"//\s*";

struct Patterns {
    css_url: Regex,
    double_slash: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        css_url: Regex::new(CSS_URL_PATTERN).expect("css url pattern is valid"),
        double_slash: Regex::new(DOUBLE_SLASH_PATTERN).expect("double slash pattern is valid"),
    })
}

/// Extracts URL references from text content
///
/// # Example
///
/// ```
/// use site_mirror::crawler::extract_text_links;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// let links = extract_text_links(b"body { background: url('/bg.png') }", &seed);
/// assert_eq!(links.links[0].as_str(), "https://example.com/bg.png");
/// ```
pub fn extract_text_links(body: &[u8], seed: &Url) -> LinkSet {
    let patterns = patterns();
    let mut set = LinkSet::new();

    for found in patterns.css_url.find_iter(body) {
        let token = scan_link(body, found.end());
        set.push_token(seed, &String::from_utf8_lossy(token), "url()");
    }

    for found in patterns.double_slash.find_iter(body) {
        let token = scan_link(body, found.end());
        if token.is_empty() {
            continue;
        }
        let scheme = scheme_before(body, found.start());
        let link = format!(
            "{}//{}",
            String::from_utf8_lossy(scheme),
            String::from_utf8_lossy(token)
        );
        set.push_token(seed, &link, "text");
    }

    set
}

/// Returns the link that starts at `start`
pub(crate) fn scan_link(body: &[u8], start: usize) -> &[u8] {
    let mut begin = start;
    while begin < body.len() && body[begin] == b' ' {
        begin += 1;
    }
    if begin >= body.len() {
        return &[];
    }

    match body[begin] {
        quote @ (b'"' | b'\'' | b'`') => scan_quoted(body, begin + 1, quote),
        _ => scan_unquoted(body, begin),
    }
}

fn scan_quoted(body: &[u8], begin: usize, quote: u8) -> &[u8] {
    for i in begin..body.len() {
        if body[i] == quote && (i == begin || body[i - 1] != b'\\') {
            return &body[begin..i];
        }
    }
    &body[begin..]
}

fn scan_unquoted(body: &[u8], begin: usize) -> &[u8] {
    // Depths for {}, () and <>
    let (mut braces, mut parens, mut angles) = (0i32, 0i32, 0i32);

    for i in begin..body.len() {
        let c = body[i];
        if matches!(c, b'"' | b'\'' | b'`') {
            return &body[begin..i];
        }

        let outside = braces <= 0 && parens <= 0 && angles <= 0;
        if outside && (c <= b' ' || matches!(c, b'}' | b')' | b'>')) {
            return &body[begin..i];
        }

        match c {
            b'{' => braces += 1,
            b'}' => braces -= 1,
            b'(' => parens += 1,
            b')' => parens -= 1,
            b'<' => angles += 1,
            b'>' => angles -= 1,
            _ => {}
        }
    }
    &body[begin..]
}

/// Returns `scheme:` when it directly precedes the `//` at `slashes`
fn scheme_before(body: &[u8], slashes: usize) -> &[u8] {
    if slashes == 0 || body[slashes - 1] != b':' {
        return &[];
    }

    let colon = slashes - 1;
    let mut start = colon;
    while start > 0 {
        let c = body[start - 1];
        if c.is_ascii_alphanumeric() || matches!(c, b'+' | b'-' | b'.') {
            start -= 1;
        } else {
            break;
        }
    }

    // A scheme must start with a letter
    while start < colon && !body[start].is_ascii_alphabetic() {
        start += 1;
    }
    if start == colon {
        return &[];
    }
    &body[start..slashes]
}
