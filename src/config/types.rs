use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Site-Mirror
///
/// Every section and key is optional; missing values take the defaults
/// documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight HTTP requests (default 20)
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Retries allowed for ordinary transport/body failures (default 3)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// URLs longer than this are skipped without fetching (default 1000)
    #[serde(rename = "max-url-length")]
    pub max_url_length: usize,

    /// Per-request timeout in seconds, 0 leaves the transport default
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 20,
            max_retries: 3,
            max_url_length: 1000,
            request_timeout: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which per-site folders and logs are created.
    /// Defaults to the directory of the running executable.
    pub root: Option<PathBuf>,
}

/// Progress report configuration for the command-line front end
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Milliseconds between progress reports
    pub interval: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { interval: 1000 }
    }
}
