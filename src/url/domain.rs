use url::Url;

/// Returns the URL's hostname without port, or an empty string
pub fn hostname(url: &Url) -> &str {
    url.host_str().unwrap_or("")
}

/// Returns true if the URL's scheme can be fetched and stored
///
/// Only `http`, `https` and `file` are processable; `mailto:`, `tel:`,
/// `ftp:`, `javascript:`, `data:` and everything else is recorded but
/// never fetched.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::is_processable_scheme;
///
/// assert!(is_processable_scheme(&Url::parse("https://example.com/").unwrap()));
/// assert!(!is_processable_scheme(&Url::parse("mailto:me@example.com").unwrap()));
/// ```
pub fn is_processable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "file")
}

/// Returns true if the URL belongs to a different host than the seed
///
/// This is an exact hostname comparison: subdomains of the seed are
/// foreign too.
pub fn is_foreign(seed_host: &str, url: &Url) -> bool {
    hostname(url) != seed_host
}
