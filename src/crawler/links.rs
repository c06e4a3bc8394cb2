//! Result type shared by the link extractors

use crate::url::resolve_relative;
use url::Url;

/// URLs found in a body plus the diagnostics for tokens that failed to parse
#[derive(Debug, Default, Clone)]
pub struct LinkSet {
    pub links: Vec<Url>,
    pub errors: Vec<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `token` against the seed and records the outcome
    ///
    /// Blank tokens are ignored. Unparseable tokens are logged and kept as
    /// diagnostics; they never abort extraction.
    pub(crate) fn push_token(&mut self, seed: &Url, token: &str, context: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }

        match resolve_relative(seed, token) {
            Ok(url) => self.links.push(url),
            Err(e) => {
                let message = format!("Failed to parse link \"{}\" in {}: {}", token, context, e);
                tracing::debug!("{}", message);
                self.errors.push(message);
            }
        }
    }

    /// Appends the results of another extractor
    pub fn extend(&mut self, other: LinkSet) {
        self.links.extend(other.links);
        self.errors.extend(other.errors);
    }

    /// Most recent extraction diagnostic
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
