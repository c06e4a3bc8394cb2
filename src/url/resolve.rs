use url::{ParseError, Url};

/// Returns the seed's scheme and host with an empty path
pub fn site_root(seed: &Url) -> Url {
    let mut root = seed.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Resolves a link found in a fetched body into an absolute URL
///
/// Absolute links are kept as they are. Anything else takes its scheme and
/// host from the seed and is resolved against the site root, so `logo.png`
/// and `/logo.png` name the same resource. Fragments are dropped since they
/// never reach the server.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::resolve_relative;
///
/// let seed = Url::parse("http://example.com/blog/post").unwrap();
/// let url = resolve_relative(&seed, "img/logo.png").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/img/logo.png");
/// ```
pub fn resolve_relative(seed: &Url, link: &str) -> Result<Url, ParseError> {
    let mut url = match Url::parse(link) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => site_root(seed).join(link)?,
        Err(e) => return Err(e),
    };
    url.set_fragment(None);
    Ok(url)
}

/// Builds the URL of a well-known file at the root of the seed's site
pub fn root_file(seed: &Url, path: &str) -> Url {
    let mut url = site_root(seed);
    url.set_path(path);
    url
}
