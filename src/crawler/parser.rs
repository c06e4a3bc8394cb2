//! Structural HTML link extractor
//!
//! This module walks the parsed tag tree and extracts:
//! - one URL from every `src` and `href` attribute, on any element
//! - one URL per candidate from every `srcset` and `data-srcset` attribute,
//!   with width/density descriptors discarded
//!
//! Links are resolved against the seed's scheme and host. Filtering by
//! scheme, host and duplicates happens later, at registration.

use super::links::LinkSet;
use scraper::Html;
use url::Url;

/// Extracts every link from the attributes of an HTML document
///
/// # Example
///
/// ```
/// use site_mirror::crawler::extract_html_links;
/// use url::Url;
///
/// let html = br#"<html><body><a href="/page">Link</a></body></html>"#;
/// let seed = Url::parse("https://example.com/").unwrap();
/// let links = extract_html_links(html, &seed);
/// assert_eq!(links.links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_html_links(body: &[u8], seed: &Url) -> LinkSet {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut set = LinkSet::new();
    for node in document.tree.nodes() {
        let Some(element) = node.value().as_element() else {
            continue;
        };

        for (name, value) in element.attrs() {
            match name {
                "src" | "href" => {
                    let context = format!("<{} {}>", element.name(), name);
                    set.push_token(seed, value, &context);
                }
                "srcset" | "data-srcset" => {
                    let context = format!("<{} {}>", element.name(), name);
                    for candidate in srcset_candidates(value) {
                        set.push_token(seed, candidate, &context);
                    }
                }
                _ => {}
            }
        }
    }

    set
}

/// Splits a srcset value into its candidate URLs
///
/// `"a.png 1x, b.png 2x"` yields `a.png` and `b.png`.
fn srcset_candidates(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn urls(html: &str) -> Vec<String> {
        extract_html_links(html.as_bytes(), &seed())
            .links
            .iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_href_and_src() {
        let found = urls(r#"<html><body><a href="/about">About</a><img src="logo.png"></body></html>"#);
        assert_eq!(
            found,
            vec!["https://example.com/about", "https://example.com/logo.png"]
        );
    }

    #[test]
    fn test_any_element_counts() {
        let found = urls(
            r#"<html><head>
                <link rel="stylesheet" href="/style.css">
                <script src="/app.js"></script>
            </head><body>
                <iframe src="/frame.html"></iframe>
                <video src="/movie.mp4"></video>
            </body></html>"#,
        );
        assert_eq!(found.len(), 4);
        assert!(found.contains(&"https://example.com/style.css".to_string()));
        assert!(found.contains(&"https://example.com/app.js".to_string()));
        assert!(found.contains(&"https://example.com/frame.html".to_string()));
        assert!(found.contains(&"https://example.com/movie.mp4".to_string()));
    }

    #[test]
    fn test_absolute_and_foreign_kept() {
        let found = urls(r#"<a href="https://other.com/x">x</a>"#);
        assert_eq!(found, vec!["https://other.com/x"]);
    }

    #[test]
    fn test_other_schemes_kept_for_registration() {
        let found = urls(r#"<a href="mailto:me@example.com">mail</a><a href="tel:+1">tel</a>"#);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_srcset_descriptors_discarded() {
        let found = urls(r#"<img srcset="small.jpg 480w, /large.jpg 1080w">"#);
        assert_eq!(
            found,
            vec!["https://example.com/small.jpg", "https://example.com/large.jpg"]
        );
    }

    #[test]
    fn test_data_srcset() {
        let found = urls(r#"<img data-srcset="/a.webp 1x,/b.webp 2x">"#);
        assert_eq!(
            found,
            vec!["https://example.com/a.webp", "https://example.com/b.webp"]
        );
    }

    #[test]
    fn test_empty_attributes_ignored() {
        let found = urls(r#"<a href="">empty</a><img srcset=" , ">"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_unrelated_attributes_ignored() {
        let found = urls(r#"<div data-url="/x" title="/y">text</div>"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_bad_link_is_non_fatal() {
        let set = extract_html_links(
            br#"<a href="http://[::1">bad</a><a href="/good">good</a>"#,
            &seed(),
        );
        assert_eq!(set.links.len(), 1);
        assert_eq!(set.errors.len(), 1);
    }

    #[test]
    fn test_malformed_html_still_parsed() {
        let found = urls(r#"<html><body><p><a href="/ok">unclosed <b>tags"#);
        assert_eq!(found, vec!["https://example.com/ok"]);
    }
}
