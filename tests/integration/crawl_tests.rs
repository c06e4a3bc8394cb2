//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! mirror cycle end-to-end, plus in-process transports for the retry,
//! concurrency and termination properties.

use async_trait::async_trait;
use site_mirror::config::Config;
use site_mirror::crawler::{FetchError, Transport, TransportResponse};
use site_mirror::{Crawler, Resource, ResourceState, RunState, StartParams};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

/// Creates a test configuration writing under `root`
fn create_test_config(root: &TempDir) -> Config {
    let mut config = Config::default();
    config.output.root = Some(root.path().to_path_buf());
    config.user_agent.crawler_name = "TestMirror".to_string();
    config
}

fn find(resources: &[Arc<Resource>], url: &str) -> Arc<Resource> {
    resources
        .iter()
        .find(|r| r.url().as_str() == url)
        .cloned()
        .unwrap_or_else(|| panic!("{} was not registered", url))
}

async fn mount_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mirror_pages_and_assets() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/about">About</a>
        <img src="logo.png">
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/about", "<html><body>About us</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let crawler = Crawler::from_config(create_test_config(&root)).unwrap();
    let state = crawler.run(StartParams::new(base.as_str())).await.unwrap();
    assert_eq!(state, RunState::Complete);

    let resources = crawler.resources();
    // Home page, robots.txt, sitemap.xml, /about and /logo.png
    assert_eq!(resources.len(), 5);

    let home = find(&resources, &format!("{}/", base));
    assert_eq!(home.state(), ResourceState::Complete);
    assert_eq!(home.mime().as_deref(), Some("text/html; charset=utf-8"));

    let logo = find(&resources, &format!("{}/logo.png", base));
    assert_eq!(logo.state(), ResourceState::Complete);
    assert_eq!(logo.mime().as_deref(), Some("image/png"));
    assert_eq!(logo.size(), PNG.len() as u64);

    // Unmocked seeds answer 404
    let robots = find(&resources, &format!("{}/robots.txt", base));
    assert_eq!(robots.state(), ResourceState::RequestError);

    let site = root.path().join("127.0.0.1");
    assert_eq!(crawler.output_directory(), Some(site.clone()));
    assert!(site.join("index.html").is_file());
    assert!(site.join("about.html").is_file());
    assert_eq!(std::fs::read(site.join("logo.png")).unwrap(), PNG);
    assert!(root.path().join("127.0.0.1.log").is_file());
}

#[tokio::test]
async fn test_foreign_links_are_recorded_not_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="https://other.com/x">Elsewhere</a></body></html>"#,
    )
    .await;

    let root = TempDir::new().unwrap();
    let crawler = Crawler::from_config(create_test_config(&root)).unwrap();
    let state = crawler.run(StartParams::new(base.as_str())).await.unwrap();
    assert_eq!(state, RunState::Complete);

    let foreign = find(&crawler.resources(), "https://other.com/x");
    assert!(foreign.is_external());
    assert_eq!(foreign.state(), ResourceState::Skip);

    let report = crawler.snapshot_report(true);
    assert_eq!(report.totals.external, 1);
    assert_eq!(report.totals.local, 3);
    assert!(report
        .entries
        .iter()
        .any(|entry| entry.url == "https://other.com/x"));
}

#[tokio::test]
async fn test_service_unavailable_then_success() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_html(&server, "/", "<html><body>Back online</body></html>").await;

    let root = TempDir::new().unwrap();
    let crawler = Crawler::from_config(create_test_config(&root)).unwrap();

    let started = Instant::now();
    let state = crawler.run(StartParams::new(base.as_str())).await.unwrap();
    assert_eq!(state, RunState::Complete);
    assert!(started.elapsed() >= Duration::from_millis(200));

    let home = find(&crawler.resources(), &format!("{}/", base));
    assert_eq!(home.state(), ResourceState::Complete);
    assert_eq!(home.repeats(), 1);
}

#[tokio::test]
async fn test_existing_output_dir_is_left_alone() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_html(&server, "/", "<html><body>Home</body></html>").await;

    let root = TempDir::new().unwrap();
    let site = root.path().join("127.0.0.1");
    std::fs::create_dir(&site).unwrap();
    std::fs::write(site.join("index.html"), b"previous mirror").unwrap();

    let crawler = Crawler::from_config(create_test_config(&root)).unwrap();
    let state = crawler.run(StartParams::new(base.as_str())).await.unwrap();

    assert_eq!(state, RunState::OutputDirExist);
    assert_eq!(
        std::fs::read(site.join("index.html")).unwrap(),
        b"previous mirror"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(crawler.resources().is_empty());
}

#[tokio::test]
async fn test_overwrite_replaces_previous_mirror() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_html(&server, "/", "<html><body>Home</body></html>").await;

    let root = TempDir::new().unwrap();
    let site = root.path().join("127.0.0.1");
    std::fs::create_dir(&site).unwrap();
    std::fs::write(site.join("stale.html"), b"stale").unwrap();

    let crawler = Crawler::from_config(create_test_config(&root)).unwrap();
    let state = crawler
        .run(StartParams::new(base.as_str()).replace_output_dir(true))
        .await
        .unwrap();

    assert_eq!(state, RunState::Complete);
    assert!(!site.join("stale.html").exists());
    assert!(site.join("index.html").is_file());
}

/// Response served by the in-process transports
struct StaticResponse {
    status: u16,
    body: Vec<u8>,
}

#[async_trait]
impl TransportResponse for StaticResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.body.len() as u64)
    }

    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, FetchError> {
        Ok(self.body)
    }
}

/// Fails every request and counts attempts per URL
#[derive(Default)]
struct FailingTransport {
    calls: Mutex<HashMap<String, usize>>,
}

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, url: &Url) -> Result<Box<dyn TransportResponse>, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;
        Err(FetchError::Transport("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_retry_ceiling() {
    let root = TempDir::new().unwrap();
    let transport = Arc::new(FailingTransport::default());
    let crawler = Crawler::new(create_test_config(&root), transport.clone());

    let state = crawler
        .run(StartParams::new("example.com").max_retries(2))
        .await
        .unwrap();
    assert_eq!(state, RunState::Complete);

    for resource in crawler.resources() {
        assert_eq!(resource.state(), ResourceState::RequestError);
        assert_eq!(resource.repeats(), 2);
    }
    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.get("http://example.com/"), Some(&3));
    assert_eq!(calls.get("http://example.com/robots.txt"), Some(&3));
    assert_eq!(calls.get("http://example.com/sitemap.xml"), Some(&3));
}

/// Serves a site from memory and records the peak number of concurrent requests
#[derive(Default)]
struct SiteTransport {
    pages: HashMap<String, String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl SiteTransport {
    fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl Transport for SiteTransport {
    async fn send(&self, url: &Url) -> Result<Box<dyn TransportResponse>, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = match self.pages.get(url.as_str()) {
            Some(body) => StaticResponse {
                status: 200,
                body: body.clone().into_bytes(),
            },
            None => StaticResponse {
                status: 404,
                body: Vec::new(),
            },
        };
        Ok(Box::new(response))
    }
}

#[tokio::test]
async fn test_bounded_concurrency() {
    let links: String = (0..40)
        .map(|i| format!("<a href=\"/p{}\">{}</a>", i, i))
        .collect();
    let mut transport = SiteTransport {
        delay: Duration::from_millis(20),
        ..SiteTransport::default()
    }
    .page(
        "http://example.com/",
        format!("<html><body>{}</body></html>", links),
    );
    for i in 0..40 {
        transport = transport.page(
            &format!("http://example.com/p{}", i),
            "<html><body>leaf</body></html>",
        );
    }
    let transport = Arc::new(transport);

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.crawler.max_concurrent_requests = 4;
    let crawler = Crawler::new(config, transport.clone());

    let state = crawler.run(StartParams::new("example.com")).await.unwrap();
    assert_eq!(state, RunState::Complete);

    assert!(transport.peak.load(Ordering::SeqCst) <= 4);
    let resources = crawler.resources();
    assert_eq!(resources.len(), 43);
    let saved = resources
        .iter()
        .filter(|r| r.state() == ResourceState::Complete)
        .count();
    assert_eq!(saved, 41);
}

#[tokio::test]
async fn test_cyclic_links_terminate() {
    let transport = SiteTransport::default()
        .page(
            "http://example.com/",
            r#"<html><body><a href="/a">a</a></body></html>"#,
        )
        .page(
            "http://example.com/a",
            r#"<html><body><a href="/b">b</a><a href="/">home</a></body></html>"#,
        )
        .page(
            "http://example.com/b",
            r#"<html><body><a href="/a">a</a><a href="b">self</a></body></html>"#,
        );

    let root = TempDir::new().unwrap();
    let crawler = Crawler::new(create_test_config(&root), Arc::new(transport));

    let state = tokio::time::timeout(
        Duration::from_secs(10),
        crawler.run(StartParams::new("example.com")),
    )
    .await
    .expect("run should terminate")
    .unwrap();

    assert_eq!(state, RunState::Complete);
    assert_eq!(crawler.resources().len(), 5);
    assert_eq!(crawler.active_tasks(), 0);

    let site = root.path().join("example.com");
    assert!(site.join("index.html").is_file());
    assert!(site.join("a.html").is_file());
    assert!(site.join("b.html").is_file());
}

#[tokio::test]
async fn test_start_while_scanning_is_rejected() {
    let transport = SiteTransport {
        delay: Duration::from_millis(200),
        ..SiteTransport::default()
    };

    let root = TempDir::new().unwrap();
    let crawler = Crawler::new(create_test_config(&root), Arc::new(transport));

    crawler.start(StartParams::new("example.com")).unwrap();
    let second = crawler.start(StartParams::new("example.org"));
    assert!(second.is_err());

    assert_eq!(crawler.wait().await, RunState::Complete);
    assert_eq!(crawler.seed_url().unwrap().as_str(), "http://example.com/");
}
