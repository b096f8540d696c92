use linkshelf::links::{FetchOptions, MetadataFetcher};
use linkshelf::error::FetchError;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_fetcher() -> MetadataFetcher {
    let options = FetchOptions {
        block_private_hosts: false,
        ..FetchOptions::default()
    };
    MetadataFetcher::new(&options).expect("fetcher should build")
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{page}", server.uri())).expect("mock url should parse")
}

#[tokio::test]
async fn metadata_is_read_from_served_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<!doctype html><html><head>
                <title>Rust Ownership Explained</title>
                <meta property="og:description" content="A tour of borrowing">
                <link rel="shortcut icon" href="//cdn.example.com/f.ico">
            </head><body><p>Hello</p></body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = local_fetcher()
        .try_fetch(&page_url(&server, "/article"))
        .await
        .expect("page should be fetched");

    assert_eq!(metadata.title, "Rust Ownership Explained");
    assert_eq!(metadata.description.as_deref(), Some("A tour of borrowing"));
    assert_eq!(metadata.favicon, "https://cdn.example.com/f.ico");
}

#[tokio::test]
async fn relative_favicon_resolves_against_mock_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Home</title></head></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let metadata = local_fetcher().fetch(&page_url(&server, "/")).await;

    assert_eq!(metadata.title, "Home");
    assert_eq!(metadata.favicon, format!("{}/favicon.ico", server.uri()));
    assert!(metadata.description.is_none());
}

#[tokio::test]
async fn error_status_surfaces_then_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = page_url(&server, "/missing");
    let fetcher = local_fetcher();

    let err = fetcher.try_fetch(&url).await.expect_err("404 should be an error");
    assert!(matches!(err, FetchError::Status { status: 404, .. }));

    let metadata = fetcher.fetch(&url).await;
    assert_eq!(metadata.title, "127.0.0.1");
    assert_eq!(metadata.favicon, format!("{}/favicon.ico", server.uri()));
}

#[tokio::test]
async fn guarded_fetcher_never_contacts_loopback_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<title>Internal</title>",
            "text/html",
        ))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&FetchOptions::default()).expect("fetcher should build");
    let url = page_url(&server, "/admin");

    let err = fetcher.try_fetch(&url).await.expect_err("loopback should be blocked");
    assert!(matches!(err, FetchError::Blocked { .. }));
    assert_eq!(fetcher.fetch(&url).await.title, "127.0.0.1");
}

#[tokio::test]
async fn metadata_comes_from_the_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Moved Here</title><link rel="icon" href="/moved.ico"></head></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = local_fetcher()
        .try_fetch(&page_url(&server, "/old"))
        .await
        .expect("redirect should be followed");

    assert_eq!(metadata.title, "Moved Here");
    assert_eq!(metadata.favicon, format!("{}/moved.ico", server.uri()));
}

#[tokio::test]
async fn redirect_loop_stops_and_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/pong"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pong"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/ping"))
        .mount(&server)
        .await;

    let url = page_url(&server, "/ping");
    let fetcher = local_fetcher();

    let err = fetcher.try_fetch(&url).await.expect_err("loop should be cut off");
    assert!(matches!(err, FetchError::Request { .. }));

    let metadata = fetcher.fetch(&url).await;
    assert_eq!(metadata.title, "127.0.0.1");
    assert_eq!(metadata.favicon, format!("{}/favicon.ico", server.uri()));
    assert!(metadata.description.is_none());

    // Two fetch attempts, each capped at the initial request plus five hops.
    let requests = server.received_requests().await.expect("recording is on");
    assert_eq!(requests.len(), 12);
}
