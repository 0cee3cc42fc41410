//! End-to-end crawl runs against mock catalog sites

use crate::support::{listing_page, test_config};
use catalog_crawler::crawler::crawl_until;
use catalog_crawler::output::read_records;
use catalog_crawler::{BooksExtractor, CrawlError, StopReason};
use std::collections::HashSet;
use std::future::pending;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Two listing pages with 2 + 1 items
async fn two_page_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        listing_page(
            &[
                ("catalogue/first_1/index.html", "First", "51.77", "Three"),
                ("catalogue/second_2/index.html", "Second", "12.00", "One"),
            ],
            Some("catalogue/page-2.html"),
        ),
    )
    .await;
    mount_page(
        server,
        "/catalogue/page-2.html",
        listing_page(&[("third_3/index.html", "Third", "1,234.50", "Five")], None),
    )
    .await;
}

#[tokio::test]
async fn test_crawl_follows_pagination_to_the_end() {
    let server = MockServer::start().await;
    two_page_site(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data").join("items.jsonl");
    let config = test_config(&server, &output);

    let summary = crawl_until(config, BooksExtractor, pending()).await.unwrap();

    assert!(matches!(summary.stop_reason, StopReason::NoNextPage));
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.items_written, 3);
    assert_eq!(summary.fetch_attempts, 2);
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));

    let records = read_records(&output).unwrap();
    assert_eq!(records.len(), 3);

    let third = &records[2];
    assert_eq!(third.url, format!("{}/catalogue/third_3/index.html", server.uri()));
    assert_eq!(third.title, "Third");
    assert_eq!(third.price, 1234.5);
    assert_eq!(third.rating, 5);
    assert_eq!(third.availability, "In stock");
    assert_eq!(third.category, "");
    assert_eq!(third.site, "books");
}

#[tokio::test]
async fn test_robots_disallow_stops_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let summary = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::RobotsDisallowed(_)));
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.pages_crawled, 0);
    assert_eq!(summary.fetch_attempts, 0);
    assert!(read_records(&output).unwrap().is_empty());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        listing_page(&[("catalogue/only_1/index.html", "Only", "3.00", "Two")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let summary = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::NoNextPage));
    assert_eq!(summary.fetch_attempts, 3);
    assert_eq!(summary.items_written, 1);
}

#[tokio::test]
async fn test_max_pages_limits_the_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        listing_page(&[("catalogue/a_1/index.html", "A", "1.00", "One")], Some("catalogue/page-2.html")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[("b_2/index.html", "B", "2.00", "Two")],
            Some("page-3.html"),
        )))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let mut config = test_config(&server, &output);
    config.max_pages = 1;

    let summary = crawl_until(config, BooksExtractor, pending()).await.unwrap();

    assert!(matches!(summary.stop_reason, StopReason::MaxPagesReached));
    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.fetch_attempts, 1);
    assert_eq!(read_records(&output).unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_error_is_fatal_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let summary = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    match &summary.stop_reason {
        StopReason::Fatal(CrawlError::Fetch(e)) => {
            assert!(!e.is_exhausted());
            assert!(!e.is_retryable());
        }
        other => panic!("unexpected stop reason: {}", other),
    }
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.fetch_attempts, 1);
}

#[tokio::test]
async fn test_loop_guard_on_self_referencing_pager() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        listing_page(&[("catalogue/a_1/index.html", "A", "1.00", "One")], Some("/#top")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let mut config = test_config(&server, &output);
    config.max_pages = 50;

    let summary = crawl_until(config, BooksExtractor, pending()).await.unwrap();

    assert!(matches!(summary.stop_reason, StopReason::AlreadyVisited(_)));
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.pages_crawled, 1);
}

#[tokio::test]
async fn test_duplicate_items_across_pages_written_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        listing_page(
            &[
                ("catalogue/a_1/index.html", "A", "1.00", "One"),
                ("catalogue/a_1/index.html?utm_source=feed", "A", "1.00", "One"),
            ],
            Some("catalogue/page-2.html"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-2.html",
        listing_page(
            &[
                ("a_1/index.html", "A", "1.00", "One"),
                ("b_2/index.html", "B", "2.00", "Two"),
            ],
            None,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let summary = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    let records = read_records(&output).unwrap();
    let keys: HashSet<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(keys.len(), records.len());
    assert_eq!(summary.unique_items, 2);
}

#[tokio::test]
async fn test_output_appends_across_runs() {
    let server = MockServer::start().await;
    two_page_site(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");

    let first = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();
    let second = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    assert_eq!(first.items_written, 3);
    assert_eq!(second.items_written, 3);
    assert_eq!(read_records(&output).unwrap().len(), 6);
}

#[tokio::test]
async fn test_dry_run_leaves_no_output() {
    let server = MockServer::start().await;
    two_page_site(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let mut config = test_config(&server, &output);
    config.dry_run = true;

    let summary = crawl_until(config, BooksExtractor, pending()).await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.unique_items, 3);
    assert_eq!(summary.items_written, 0);
    assert!(summary.output.is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_shutdown_interrupts_slow_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        listing_page(&[("catalogue/a_1/index.html", "A", "1.00", "One")], Some("catalogue/page-2.html")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[], None))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");
    let mut config = test_config(&server, &output);
    config.fetcher.timeout_ms = 10_000;

    let started = Instant::now();
    let summary = crawl_until(
        config,
        BooksExtractor,
        tokio::time::sleep(Duration::from_millis(500)),
    )
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(summary.stop_reason, StopReason::Interrupted));
    assert_eq!(summary.exit_code(), 130);
    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(read_records(&output).unwrap().len(), 1);
}

#[tokio::test]
async fn test_robots_crawl_delay_slows_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 0.3\n"))
        .mount(&server)
        .await;
    two_page_site(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("items.jsonl");

    let started = Instant::now();
    let summary = crawl_until(test_config(&server, &output), BooksExtractor, pending())
        .await
        .unwrap();

    // Two pages, each preceded by the robots delay
    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(summary.pages_crawled, 2);
}
