use crate::UrlError;
use std::path::{Component, Path};
use url::Url;

/// Inputs shorter than this cannot name a site
pub const MIN_SEED_LENGTH: usize = 5;

/// Parses user-supplied site input into a seed URL
///
/// Accepted forms:
/// - `http://...` and `https://...` are parsed as-is
/// - `//host/...` (protocol-relative) is parsed as `http:`
/// - anything else is treated as a bare host/path and prefixed with `http://`
///
/// Surrounding whitespace is ignored and the fragment is dropped.
///
/// # Examples
///
/// ```
/// use site_mirror::url::parse_seed;
///
/// let url = parse_seed("Example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn parse_seed(text: &str) -> Result<Url, UrlError> {
    let text = text.trim();
    if text.chars().count() < MIN_SEED_LENGTH {
        return Err(UrlError::TooShort);
    }

    let lower = text.to_ascii_lowercase();
    let candidate = if lower.starts_with("https://") || lower.starts_with("http://") {
        text.to_string()
    } else if lower.starts_with("//") {
        format!("http:{}", text)
    } else {
        format!("http://{}", text)
    };

    let mut url = Url::parse(&candidate).map_err(|e| match e {
        url::ParseError::EmptyHost => UrlError::EmptyHost,
        other => UrlError::Parse(other),
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => check_host_component(host)?,
        _ => return Err(UrlError::EmptyHost),
    }

    url.set_fragment(None);
    Ok(url)
}

/// The host names the site directory, so it must be one plain path component.
/// The url crate accepts `.` and `..` (also percent-encoded) as hosts.
fn check_host_component(host: &str) -> Result<(), UrlError> {
    let mut components = Path::new(host).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == host => Ok(()),
        _ => Err(UrlError::InvalidHost(host.to_string())),
    }
}
