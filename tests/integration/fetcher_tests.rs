//! Fetcher behavior against a mock server: classification, retries, timeouts

use crate::support::{fast_fetcher_config, TEST_AGENT};
use catalog_crawler::config::FetcherConfig;
use catalog_crawler::crawler::Fetcher;
use catalog_crawler::{FetchError, FetchErrorKind};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(config: &FetcherConfig) -> Fetcher {
    Fetcher::new(TEST_AGENT, Duration::ZERO, config).unwrap()
}

fn page_url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_success_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .and(header("user-agent", TEST_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&fast_fetcher_config());
    let page = fetcher
        .fetch_page(&page_url(&server, "/catalogue/page-1.html"))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>ok</html>");
    assert_eq!(page.attempts, 1);
    assert_eq!(fetcher.total_attempts(), 1);
}

#[tokio::test]
async fn test_fetch_text_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("listing"))
        .mount(&server)
        .await;

    let text = fetcher(&fast_fetcher_config())
        .fetch_text(&page_url(&server, "/"))
        .await
        .unwrap();
    assert_eq!(text, "listing");
}

#[tokio::test]
async fn test_server_errors_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&server)
        .await;

    let fetcher = fetcher(&fast_fetcher_config());
    let page = fetcher.fetch_page(&page_url(&server, "/")).await.unwrap();

    assert_eq!(page.body, "finally");
    assert_eq!(page.attempts, 3);
    assert_eq!(fetcher.total_attempts(), 3);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let page = fetcher(&fast_fetcher_config())
        .fetch_page(&page_url(&server, "/"))
        .await
        .unwrap();
    assert_eq!(page.attempts, 2);
}

#[tokio::test]
async fn test_retry_ceiling_is_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let config = FetcherConfig {
        max_retries: 4,
        ..fast_fetcher_config()
    };
    let err = fetcher(&config)
        .fetch_page(&page_url(&server, "/"))
        .await
        .unwrap_err();

    match &err {
        FetchError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(*attempts, 4);
            assert!(matches!(**last, FetchError::ServerError { status: 503, .. }));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
    assert!(err.is_exhausted());
    assert_eq!(err.kind(), FetchErrorKind::ServerError);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&fast_fetcher_config())
        .fetch_page(&page_url(&server, "/missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::ClientError { status: 404, .. }));
    assert_eq!(err.kind(), FetchErrorKind::ClientError);
    assert!(!err.is_exhausted());
}

#[tokio::test]
async fn test_timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = FetcherConfig {
        timeout_ms: 100,
        max_retries: 2,
        ..fast_fetcher_config()
    };
    let err = fetcher(&config)
        .fetch_page(&page_url(&server, "/slow"))
        .await
        .unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(err.kind(), FetchErrorKind::NetworkError);
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_exhausted() {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let fetcher = fetcher(&fast_fetcher_config());
    let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
    let err = fetcher.fetch_page(&url).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::NetworkError);
    assert!(err.is_exhausted());
    assert_eq!(fetcher.total_attempts(), 3);
}
