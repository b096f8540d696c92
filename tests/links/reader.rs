use linkshelf::error::FetchError;
use linkshelf::links::{FetchOptions, ReaderClient, SUMMARY_UNAVAILABLE};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const READER_DOCUMENT: &str = "Title: Ownership in Rust\n\
URL Source: https://example.com/post\n\
Published Time: 2024-01-01\n\
Markdown Content:\n\
# Ownership\n\
\n\
Ownership is the set of rules that govern how a Rust program manages memory at runtime.\n\
\n\
![diagram](https://example.com/d.png)\n\
!Image 1: chart\n";

fn reader(server: &MockServer) -> ReaderClient {
    ReaderClient::new(&server.uri(), &FetchOptions::default()).expect("reader should build")
}

#[tokio::test]
async fn reader_request_encodes_target_and_asks_for_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/https%3A%2F%2Fexample.com%2Fpost"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string(READER_DOCUMENT))
        .expect(1)
        .mount(&server)
        .await;

    let raw = reader(&server)
        .fetch_raw("example.com/post")
        .await
        .expect("reader should answer");

    assert!(raw.starts_with("Title: Ownership in Rust"));
}

#[tokio::test]
async fn summarize_derives_summary_and_clean_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(READER_DOCUMENT))
        .mount(&server)
        .await;

    let summary = reader(&server).summarize("https://example.com/post").await;

    assert_eq!(
        summary.summary,
        "Ownership is the set of rules that govern how a Rust program manages memory at runtime."
    );
    assert!(summary.full_content.starts_with("# Ownership"));
    assert!(summary.full_content.ends_with("📷 chart"));
    assert!(!summary.full_content.contains("URL Source:"));
}

#[tokio::test]
async fn reader_failure_yields_unavailable_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
        .mount(&server)
        .await;

    let client = reader(&server);
    let err = client
        .fetch_raw("https://example.com/post")
        .await
        .expect_err("503 should be an error");
    assert!(matches!(err, FetchError::Status { status: 503, .. }));

    let summary = client.summarize("https://example.com/post").await;
    assert_eq!(summary.summary, SUMMARY_UNAVAILABLE);
    assert!(summary.full_content.is_empty());
}

#[tokio::test]
async fn unreachable_reader_yields_unavailable_summary() {
    let client = ReaderClient::new("http://127.0.0.1:9", &FetchOptions::default())
        .expect("reader should build");

    let summary = client.summarize("https://example.com/post").await;
    assert_eq!(summary.summary, SUMMARY_UNAVAILABLE);
}
