//! Content-type sniffing
//!
//! The type of a downloaded body is decided from its leading bytes, never
//! from the URL or the declared Content-Type header. HTML, XML and PDF are
//! recognized by their textual signatures, other binary formats through the
//! `infer` signature database, and the remainder falls back to plain text or
//! an opaque octet stream depending on the presence of control bytes.

/// Number of leading bytes inspected
pub const SNIFF_LEN: usize = 512;

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_XML: &str = "text/xml; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Tag openings that mark a document as HTML
const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Sniffed type of a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// MIME type, possibly with parameters
    pub mime: String,
    /// Preferred file extension without the dot
    pub extension: Option<&'static str>,
}

impl ContentType {
    fn new(mime: &str, extension: Option<&'static str>) -> Self {
        Self {
            mime: mime.to_string(),
            extension,
        }
    }

    /// True for HTML documents
    pub fn is_html(&self) -> bool {
        self.mime.contains("text/html")
    }

    /// True for media and opaque binaries that cannot contain links
    pub fn is_binary_leaf(&self) -> bool {
        let mime = self.mime.as_str();
        mime.contains("application/octet-stream")
            || mime.contains("application/ogg")
            || mime.contains("model")
            || mime.contains("font")
            || mime.contains("image")
            || mime.contains("video")
            || mime.contains("audio")
    }
}

/// Determines the content type of a body from its leading bytes
///
/// # Examples
///
/// ```
/// use site_mirror::crawler::sniff;
///
/// assert!(sniff(b"<!DOCTYPE html><html></html>").is_html());
/// assert!(sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").is_binary_leaf());
/// ```
pub fn sniff(body: &[u8]) -> ContentType {
    let head = &body[..body.len().min(SNIFF_LEN)];
    let text = head.strip_prefix(UTF8_BOM).unwrap_or(head);

    let first = text
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(text.len());
    let trimmed = &text[first..];

    if HTML_SIGNATURES
        .iter()
        .any(|sig| matches_html_signature(trimmed, sig))
    {
        return ContentType::new(TEXT_HTML, Some("html"));
    }
    if trimmed.starts_with(b"<?xml") {
        return ContentType::new(TEXT_XML, Some("xml"));
    }
    if head.starts_with(b"%PDF-") {
        return ContentType::new(APPLICATION_PDF, Some("pdf"));
    }

    if let Some(kind) = infer::get(head) {
        if kind.matcher_type() != infer::MatcherType::Text {
            return ContentType::new(kind.mime_type(), Some(kind.extension()));
        }
    }

    if head.iter().any(|b| is_binary_byte(*b)) {
        ContentType::new(OCTET_STREAM, None)
    } else {
        ContentType::new(TEXT_PLAIN, Some("txt"))
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Case-insensitive prefix match that requires a space or `>` after the tag
fn matches_html_signature(data: &[u8], signature: &[u8]) -> bool {
    if data.len() <= signature.len() {
        return false;
    }
    let (prefix, rest) = data.split_at(signature.len());
    prefix.eq_ignore_ascii_case(signature) && matches!(rest[0], b' ' | b'>')
}
