//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! coordinator and HTTP fetcher end-to-end against them.

mod common;
mod control_tests;
mod crawl_tests;
