//! Pause, resume and stop against a live crawl

use crate::common::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_gather::output::MemorySink;
use sumi_gather::{Coordinator, CrawlControl, CrawlJob, RunState};
use tempfile::TempDir;
use wiremock::MockServer;

async fn wait_for_first_request(server: &MockServer) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while requested_paths(server).await.is_empty() {
        assert!(Instant::now() < deadline, "Crawler never contacted the server");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_paused_crawl_waits_for_resume() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html(r#"<img src="/a.png">"#)).await;
    mount(&server, "/a.png", image(b"a", "image/png")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let control = coordinator.control();
    assert!(control.pause());

    let handle = tokio::spawn(coordinator.run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(requested_paths(&server).await.is_empty());
    assert!(sink.events().is_empty());

    assert!(control.resume());
    let report = handle.await.unwrap().unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.images_saved, 1);
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_stop_while_paused() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html("")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let control = coordinator.control();
    control.pause();

    let handle = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(control.stop());

    let report = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("Crawl should stop promptly")
        .unwrap()
        .unwrap();

    assert_eq!(report.state, RunState::Stopped);
    assert_eq!(report.stats.pages_crawled, 0);
    assert!(requested_paths(&server).await.is_empty());
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_stop_interrupts_politeness_delay() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &server,
        "/",
        html(r#"<a href="/one">1</a><a href="/two">2</a>"#),
    )
    .await;
    mount(&server, "/one", html("")).await;
    mount(&server, "/two", html("")).await;

    let mut config = test_config(&root);
    config.crawler.politeness_delay_ms = 10_000;
    let (coordinator, sink) = coordinator(&server.uri(), config);
    let control = coordinator.control();

    let started = Instant::now();
    let handle = tokio::spawn(coordinator.run());

    wait_for_first_request(&server).await;
    assert!(control.stop());

    let report = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("Stop should cut the politeness delay short")
        .unwrap()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.state, RunState::Stopped);
    assert_eq!(request_count(&server, "/one").await, 0);
    assert_eq!(request_count(&server, "/two").await, 0);
    assert_eq!(sink.terminal_count(), 1);
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn test_shared_control_handle_stops_run() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html("")).await;

    let control = Arc::new(CrawlControl::new());
    control.stop();

    let sink = Arc::new(MemorySink::new());
    let job = CrawlJob::new(&server.uri(), test_config(&root), sink.clone())
        .with_control(control.clone());
    assert!(Arc::ptr_eq(&job.control(), &control));

    let report = Coordinator::new(job).unwrap().run().await.unwrap();

    assert_eq!(report.state, RunState::Stopped);
    assert!(requested_paths(&server).await.is_empty());
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_stop_after_completion_is_harmless() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&server, "/", html("")).await;

    let (coordinator, sink) = coordinator(&server.uri(), test_config(&root));
    let control = coordinator.control();

    let report = coordinator.run().await.unwrap();
    control.stop();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(sink.terminal_count(), 1);
}
