//! Shared helpers for the integration tests

use std::sync::Arc;
use sumi_gather::config::{
    Config, CrawlerConfig, ImagesConfig, OutputConfig, UserAgentConfig,
};
use sumi_gather::output::MemorySink;
use sumi_gather::{Coordinator, CrawlJob};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration writing under `root`
pub fn test_config(root: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages: 50,
            max_depth: 1,
            follow_pagination: true,
            use_browser_assist: false,
            page_timeout_secs: 5,
            image_timeout_secs: 5,
            politeness_delay_ms: 0,
            pause_poll_ms: 10,
            max_crawl_delay_ms: 60_000,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            output_root: root.path().display().to_string(),
        },
        images: ImagesConfig::default(),
    }
}

/// An HTML page response
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

/// An image response
pub fn image(bytes: &[u8], content_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(bytes.to_vec())
        .insert_header("content-type", content_type)
}

/// Mounts a GET handler for an exact path
pub async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a robots.txt body
pub async fn mount_robots(server: &MockServer, body: &str) {
    mount(
        server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string(body.to_string()),
    )
    .await;
}

/// The `host:port` directory name used for the mock server
pub fn netloc(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse server URI");
    format!(
        "{}:{}",
        url.host_str().expect("Failed to extract host"),
        url.port().expect("Mock server has a port")
    )
}

/// Builds a coordinator over real HTTP with an in-memory sink
pub fn coordinator(seed: &str, config: Config) -> (Coordinator, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let job = CrawlJob::new(seed, config, sink.clone());
    let coordinator = Coordinator::new(job).expect("Failed to create coordinator");
    (coordinator, sink)
}

/// Paths of all GET requests the server received, in order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

/// Number of requests the server received for `route` (any query)
pub async fn request_count(server: &MockServer, route: &str) -> usize {
    requested_paths(server)
        .await
        .iter()
        .filter(|p| p.as_str() == route)
        .count()
}

/// Requests for pages only, in order (robots.txt and images excluded)
pub async fn page_requests(server: &MockServer, pages: &[&str]) -> Vec<String> {
    requested_paths(server)
        .await
        .into_iter()
        .filter(|p| pages.contains(&p.as_str()))
        .collect()
}
