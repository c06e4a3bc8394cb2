//! HTTP fetcher implementation
//!
//! This module defines the transport seam used by crawl tasks:
//! - [`Transport`] sends a request and returns a response head
//! - [`TransportResponse`] exposes the status, declared length and body
//!
//! Reading the body is a separate, fallible step so that body-read failures
//! can be retried independently of request failures. [`HttpTransport`] is the
//! production implementation over `reqwest`.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors produced by a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or no response was received
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be read
    #[error("Failed to read body: {0}")]
    Body(String),
}

/// A response whose body has not been read yet
#[async_trait]
pub trait TransportResponse: Send {
    /// HTTP status code
    fn status(&self) -> u16;

    /// Value of the Content-Length header, if any
    fn content_length(&self) -> Option<u64>;

    /// Reads the complete body
    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, FetchError>;
}

/// Performs network fetches for crawl tasks
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &Url) -> Result<Box<dyn TransportResponse>, FetchError>;
}

/// Formats a status code with its canonical reason, e.g. `503 Service Unavailable`
pub fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed, compressed bodies are decoded, and the request
/// timeout is applied only when configured.
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::Config;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.header_value())
        .gzip(true)
        .brotli(true);

    if config.crawler.request_timeout > 0 {
        builder = builder.timeout(Duration::from_secs(config.crawler.request_timeout));
    }

    builder.build()
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &Url) -> Result<Box<dyn TransportResponse>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Box::new(response))
    }
}

#[async_trait]
impl TransportResponse for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn content_length(&self) -> Option<u64> {
        reqwest::Response::content_length(self)
    }

    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, FetchError> {
        reqwest::Response::bytes(*self)
            .await
            .map(|body| body.to_vec())
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}
