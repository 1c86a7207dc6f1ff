//! End-to-end crawl behavior against a mock site

use crate::common::*;
use std::sync::Arc;
use sumi_gather::images::StaticGalleryProvider;
use sumi_gather::output::{ChannelSink, DiscoveryEvent};
use sumi_gather::{canonicalize, Coordinator, CrawlJob, GatherError, RunState};
use tempfile::TempDir;
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn test_two_page_gallery_scenario() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount(
        &server,
        "/",
        html(r#"<img src="/img1.png"><img src="/img2.jpg"><a href="/page2">Page 2</a>"#),
    )
    .await;
    mount(&server, "/page2", html(r#"<img src="/img3.gif">"#)).await;
    mount(&server, "/img1.png", image(b"one", "image/png")).await;
    mount(&server, "/img2.jpg", image(b"two", "image/jpeg")).await;
    mount(&server, "/img3.gif", image(b"three", "image/gif")).await;

    let mut config = test_config(&root);
    config.crawler.max_pages = 2;
    config.crawler.max_depth = 1;
    config.crawler.follow_pagination = false;
    let (coordinator, sink) = coordinator(&server.uri(), config);

    let report = coordinator.run().await.expect("Crawl should succeed");

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.images_saved, 3);
    assert_eq!(report.stats.pages_crawled, 2);

    let domain = netloc(&server);
    let dir = root.path().join(&domain);
    assert_eq!(report.domain_output_dir, dir);
    for name in ["img1.png", "img2.jpg", "img3.gif"] {
        assert!(dir.join(name).is_file(), "{} should be saved", name);
    }
    assert_eq!(std::fs::read(dir.join("img3.gif")).unwrap(), b"three");

    assert_eq!(
        sink.paths(),
        vec![
            format!("{}/img1.png", domain),
            format!("{}/img2.jpg", domain),
            format!("{}/img3.gif", domain),
        ]
    );
    assert_eq!(sink.terminal_count(), 1);
    assert_eq!(sink.events().last(), Some(&DiscoveryEvent::Finished));
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount(&server, "/a", html("")).await;
    mount(&server, "/b", html("")).await;

    let mut config = test_config(&root);
    config.crawler.max_depth = 0;
    let (coordinator, _sink) = coordinator(&server.uri(), config);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(page_requests(&server, &["/", "/a", "/b"]).await, vec!["/"]);
}

#[tokio::test]
async fn test_max_pages_bounds_distinct_pages() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let links: String = (1..=6)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    mount(&server, "/", html(&links)).await;
    for i in 1..=6 {
        mount(&server, &format!("/p{}", i), html(&links)).await;
    }

    let mut config = test_config(&root);
    config.crawler.max_pages = 3;
    config.crawler.max_depth = 5;
    let (coordinator, _sink) = coordinator(&server.uri(), config);

    let report = coordinator.run().await.unwrap();

    let pages = page_requests(&server, &["/", "/p1", "/p2", "/p3", "/p4", "/p5", "/p6"]).await;
    assert_eq!(report.stats.pages_crawled, 3);
    assert_eq!(pages, vec!["/", "/p1", "/p2"]);
}

#[tokio::test]
async fn test_identical_bytes_saved_once() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<img src="/first.png"><img src="/copy/second.png">"#),
    )
    .await;
    mount(&server, "/first.png", image(b"same-bytes", "image/png")).await;
    mount(&server, "/copy/second.png", image(b"same-bytes", "image/png")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 1);
    assert_eq!(report.stats.duplicates_by_content, 1);
    assert_eq!(sink.paths().len(), 1);

    let dir = root.path().join(netloc(&server));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    assert!(dir.join("first.png").is_file());
}

#[tokio::test]
async fn test_query_variants_of_one_image_saved_once() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    // Resize parameters collapse to one canonical URL; `v` survives
    // canonicalization but the bytes are identical
    mount(
        &server,
        "/",
        html(
            r#"<img src="/photo.jpg?w=300">
               <img src="/photo.jpg?w=600&amp;quality=80">
               <img src="/photo.jpg?v=2">"#,
        ),
    )
    .await;
    mount(&server, "/photo.jpg", image(b"photo", "image/jpeg")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 1);
    assert_eq!(report.stats.duplicates_by_reference, 1);
    assert_eq!(report.stats.duplicates_by_content, 1);
    assert_eq!(sink.paths().len(), 1);
}

#[tokio::test]
async fn test_same_canonical_image_downloaded_once_across_pages() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<img src="/shared.jpg?width=100"><a href="/other">Other</a>"#),
    )
    .await;
    mount(&server, "/other", html(r#"<img src="/shared.jpg?width=900#zoom">"#)).await;
    mount(&server, "/shared.jpg", image(b"shared", "image/jpeg")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_crawled, 2);
    assert_eq!(report.images_saved, 1);
    assert_eq!(request_count(&server, "/shared.jpg").await, 1);
}

#[tokio::test]
async fn test_pagination_link_fetched_first() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<a href="/about">About</a><a href="/list/2" class="pagination">Next</a>"#),
    )
    .await;
    mount(&server, "/about", html("")).await;
    mount(&server, "/list/2", html("")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    coordinator.run().await.unwrap();

    assert_eq!(
        page_requests(&server, &["/", "/about", "/list/2"]).await,
        vec!["/", "/list/2", "/about"]
    );
}

#[tokio::test]
async fn test_pagination_disabled_keeps_document_order() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<a href="/about">About</a><a href="/list/2" rel="next">2</a>"#),
    )
    .await;
    mount(&server, "/about", html("")).await;
    mount(&server, "/list/2", html("")).await;

    let mut config = test_config(&root);
    config.crawler.follow_pagination = false;
    let (coordinator, _sink) = coordinator(&server.uri(), config);
    coordinator.run().await.unwrap();

    assert_eq!(
        page_requests(&server, &["/", "/about", "/list/2"]).await,
        vec!["/", "/about", "/list/2"]
    );
}

#[tokio::test]
async fn test_robots_disallowing_seed_fetches_nothing() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nDisallow: /").await;
    mount(&server, "/", html(r#"<img src="/img1.png">"#)).await;
    mount(&server, "/img1.png", image(b"one", "image/png")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 0);
    assert_eq!(report.stats.pages_robots_skipped, 1);
    assert_eq!(request_count(&server, "/").await, 0);
    assert_eq!(request_count(&server, "/img1.png").await, 0);
    assert!(sink.paths().is_empty());
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_robots_agent_specific_rules() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_robots(
        &server,
        "User-agent: TestBot\nDisallow: /private\n\nUser-agent: *\nDisallow: /",
    )
    .await;
    mount(
        &server,
        "/",
        html(r#"<a href="/private/a">A</a><a href="/public">B</a>"#),
    )
    .await;
    mount(&server, "/private/a", html("")).await;
    mount(&server, "/public", html("")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_crawled, 3);
    assert_eq!(report.stats.pages_robots_skipped, 1);
    assert_eq!(request_count(&server, "/private/a").await, 0);
    assert_eq!(request_count(&server, "/public").await, 1);
    assert_eq!(request_count(&server, "/robots.txt").await, 1);
}

#[tokio::test]
async fn test_robots_forbidden_disallows_all() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/robots.txt", ResponseTemplate::new(403)).await;
    mount(&server, "/", html("")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_robots_skipped, 1);
    assert_eq!(request_count(&server, "/").await, 0);
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/robots.txt", ResponseTemplate::new(503)).await;
    mount(&server, "/", html(r#"<a href="/next-page">more</a>"#)).await;
    mount(&server, "/next-page", html("")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_crawled, 2);
    assert_eq!(report.stats.pages_robots_skipped, 0);
    // Never retried within the run
    assert_eq!(request_count(&server, "/robots.txt").await, 1);
}

#[tokio::test]
async fn test_icons_and_inline_images_not_downloaded() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(
            r#"<img src="/assets/icons/home.png">
               <img src="/img/site-logo.png">
               <img src="data:image/png;base64,iVBORw0KGgo=">
               <img src="/photos/beach.jpg">"#,
        ),
    )
    .await;
    mount(&server, "/photos/beach.jpg", image(b"beach", "image/jpeg")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 1);
    assert_eq!(report.stats.icons_filtered, 2);
    assert_eq!(request_count(&server, "/assets/icons/home.png").await, 0);
    assert_eq!(request_count(&server, "/img/site-logo.png").await, 0);
}

#[tokio::test]
async fn test_lazy_and_srcset_images() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(
            r#"<img data-src="/lazy.jpg">
               <img srcset="/small.jpg 1x, /large.jpg 2x">
               <picture><source srcset="/hero.webp"></picture>"#,
        ),
    )
    .await;
    mount(&server, "/lazy.jpg", image(b"lazy", "image/jpeg")).await;
    mount(&server, "/large.jpg", image(b"large", "image/jpeg")).await;
    mount(&server, "/hero.webp", image(b"hero", "image/webp")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 3);
    assert_eq!(request_count(&server, "/small.jpg").await, 0);
}

#[tokio::test]
async fn test_size_suffix_variant_preferred() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html(r#"<img src="/art/piece_300x200.jpg">"#)).await;
    mount(&server, "/art/piece.jpg", image(b"full-size", "image/jpeg")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.images_saved, 1);
    let saved = &report.images[0];
    assert_eq!(saved.saved_filename, "piece_300x200.jpg");
    assert_eq!(
        std::fs::read(report.domain_output_dir.join("piece_300x200.jpg")).unwrap(),
        b"full-size"
    );
}

#[tokio::test]
async fn test_failed_images_and_pages_do_not_abort() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(
            r#"<img src="/missing.png"><img src="/ok.png">
               <a href="/broken">Broken</a><a href="/report.pdf">PDF</a>"#,
        ),
    )
    .await;
    mount(&server, "/ok.png", image(b"ok", "image/png")).await;
    mount(&server, "/broken", ResponseTemplate::new(500)).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.images_saved, 1);
    assert_eq!(report.stats.image_failures, 1);
    assert_eq!(report.stats.pages_failed, 1);
    assert_eq!(request_count(&server, "/report.pdf").await, 0);
}

#[tokio::test]
async fn test_offsite_links_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(&format!(r#"<a href="{}/elsewhere">Elsewhere</a>"#, other.uri())),
    )
    .await;
    mount(&other, "/elsewhere", html("")).await;

    let (coordinator, _sink) = coordinator(&server.uri(), test_config(&root));
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(request_count(&other, "/elsewhere").await, 0);
}

#[tokio::test]
async fn test_existing_files_get_suffixed_names() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let dir = root.path().join(netloc(&server));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("pic.png"), b"from an earlier run").unwrap();

    mount(&server, "/", html(r#"<img src="/pic.png">"#)).await;
    mount(&server, "/pic.png", image(b"new", "image/png")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    coordinator.run().await.unwrap();

    assert_eq!(std::fs::read(dir.join("pic.png")).unwrap(), b"from an earlier run");
    assert_eq!(std::fs::read(dir.join("pic_1.png")).unwrap(), b"new");
    assert_eq!(sink.paths(), vec![format!("{}/pic_1.png", netloc(&server))]);
}

#[tokio::test]
async fn test_browser_assist_feeds_pipeline() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html(r#"<img src="/gallery/a.jpg">"#)).await;
    mount(&server, "/gallery/a.jpg", image(b"a", "image/jpeg")).await;
    mount(&server, "/gallery/b.jpg", image(b"b", "image/jpeg")).await;

    let mut config = test_config(&root);
    config.crawler.use_browser_assist = true;
    config.crawler.max_depth = 0;

    let sink = Arc::new(sumi_gather::output::MemorySink::new());
    let job = CrawlJob::new(&server.uri(), config, sink.clone());
    let provider = StaticGalleryProvider::new(vec![
        "/gallery/b.jpg".to_string(),
        "/gallery/a.jpg".to_string(),
    ]);
    let coordinator = Coordinator::new(job)
        .unwrap()
        .with_gallery_provider(Arc::new(provider));

    let report = coordinator.run().await.unwrap();

    // Provider images come first; the page's copy of a.jpg is a duplicate
    assert_eq!(report.stats.pages_crawled, 1);
    assert_eq!(report.images_saved, 2);
    assert_eq!(report.stats.duplicates_by_reference, 1);
    assert_eq!(request_count(&server, "/gallery/a.jpg").await, 1);
    let domain = netloc(&server);
    assert_eq!(
        sink.paths(),
        vec![format!("{}/a.jpg", domain), format!("{}/b.jpg", domain)]
    );
}

#[tokio::test]
async fn test_channel_sink_stream_ends_with_single_terminal() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html(r#"<img src="/a.png"><img src="/b.png">"#)).await;
    mount(&server, "/a.png", image(b"a", "image/png")).await;
    mount(&server, "/b.png", image(b"b", "image/png")).await;

    let (sink, mut events) = ChannelSink::channel();
    let sink = sink.with_prefix("/images");
    let job = CrawlJob::new(&server.uri(), test_config(&root), Arc::new(sink));
    sumi_gather::gather(job).await.unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    let domain = netloc(&server);
    assert_eq!(
        received,
        vec![
            DiscoveryEvent::Image {
                path: format!("/images/{}/a.png", domain)
            },
            DiscoveryEvent::Image {
                path: format!("/images/{}/b.png", domain)
            },
            DiscoveryEvent::Finished,
        ]
    );
}

#[tokio::test]
async fn test_invalid_seed_reports_error_after_terminal() {
    let root = TempDir::new().unwrap();
    let (coordinator, sink) = coordinator("ftp://example.com/", test_config(&root));

    let result = coordinator.run().await;

    assert!(matches!(result, Err(GatherError::InvalidSeed(_))));
    assert_eq!(sink.terminal_count(), 1);
    assert!(sink.paths().is_empty());
}

#[test]
fn test_canonicalize_idempotent() {
    let urls = [
        "https://example.com/a.jpg?w=300&h=200&id=7#frag",
        "https://example.com/a.jpg?ID=7&Quality=80",
        "https://example.com/img?format=webp&fm=png&auto=compress",
        "https://example.com/p/photo_640x480.jpg",
        "https://example.com/icon.svg?w=10",
        "https://example.com/a.jpg?&&x=1&",
        "not a url at all",
        "",
    ];
    for url in urls {
        let once = canonicalize(url);
        assert_eq!(canonicalize(&once), once, "not idempotent for {:?}", url);
    }
}
