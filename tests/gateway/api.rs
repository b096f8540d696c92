use super::support::GatewayTestServer;
use linkshelf::links::SUMMARY_UNAVAILABLE;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_HTML: &str = r#"<!doctype html><html><head>
    <title>Understanding Lifetimes</title>
    <meta name="description" content="How Rust reasons about references">
    <link rel="icon" href="/icon.png">
</head><body><article>Lifetimes are named regions of code.</article></body></html>"#;

const READER_DOCUMENT: &str = "Title: Understanding Lifetimes\n\
URL Source: https://blog.example/lifetimes\n\
Markdown Content:\n\
Skip to content\n\
# Understanding Lifetimes\n\
\n\
Lifetimes are named regions of code that a reference must be valid for.\n\
\n\
[Image 1: lifetime diagram]\n";

async fn page_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lifetimes"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_HTML, "text/html"))
        .mount(&server)
        .await;
    server
}

async fn reader_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(READER_DOCUMENT))
        .mount(&server)
        .await;
    server
}

async fn create(
    client: &reqwest::Client,
    server: &GatewayTestServer,
    token: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(server.url("/api/bookmarks"))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .json(&body)
        .send()
        .await
        .expect("create request should complete")
}

async fn get_json(
    client: &reqwest::Client,
    server: &GatewayTestServer,
    token: &str,
    route: &str,
) -> (StatusCode, Value) {
    let response = client
        .get(server.url(route))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await
        .expect("request should complete");
    let status = response.status();
    let body = response.json().await.expect("response should be json");
    (status, body)
}

#[tokio::test]
async fn bookmark_routes_require_a_session() {
    let reader = reader_server().await;
    let server = GatewayTestServer::start(&reader.uri()).await;
    let client = reqwest::Client::new();

    for route in ["/api/bookmarks", "/api/tags", "/api/bookmarks/some-id"] {
        let response = client
            .get(server.url(route))
            .send()
            .await
            .expect("request should complete");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{route}");
        let body: Value = response.json().await.expect("error should be json");
        assert_eq!(body["error"], "Unauthorized");
    }

    let create = client
        .post(server.url("/api/bookmarks"))
        .json(&serde_json::json!({"url": "https://example.com"}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bookmark_lifecycle() {
    let page = page_server().await;
    let reader = reader_server().await;
    let server = GatewayTestServer::start(&reader.uri()).await;
    let client = reqwest::Client::new();
    let token = server.login(&client).await;
    let url = format!("{}/lifetimes", page.uri());

    // Create
    let created = create(
        &client,
        &server,
        &token,
        serde_json::json!({"url": url, "tags": [" rust ", "learning", "rust", ""]}),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await.expect("create response should be json");
    assert_eq!(body["message"], "Bookmark created successfully");
    let bookmark = &body["bookmark"];
    assert_eq!(bookmark["url"], url.as_str());
    assert_eq!(bookmark["title"], "Understanding Lifetimes");
    assert_eq!(bookmark["description"], "How Rust reasons about references");
    assert_eq!(bookmark["favicon"], format!("{}/icon.png", page.uri()));
    assert_eq!(
        bookmark["summary"],
        "Lifetimes are named regions of code that a reference must be valid for."
    );
    assert_eq!(bookmark["tags"], serde_json::json!(["rust", "learning"]));
    let id = bookmark["id"].as_str().expect("bookmark id").to_string();

    // Duplicate
    let duplicate = create(&client, &server, &token, serde_json::json!({"url": url})).await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let body: Value = duplicate.json().await.expect("error should be json");
    assert_eq!(body["error"], "Bookmark already exists");

    // Detail carries the cleaned long-form text
    let (status, body) = get_json(&client, &server, &token, &format!("/api/bookmarks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let full = body["bookmark"]["full_content"].as_str().expect("full content");
    assert!(full.starts_with("Skip to content\n# Understanding Lifetimes"));
    assert!(full.ends_with("📷"));

    // List and tag filter
    let (status, body) = get_json(&client, &server, &token, "/api/bookmarks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookmarks"].as_array().map(Vec::len), Some(1));

    let (_, body) = get_json(&client, &server, &token, "/api/bookmarks?tag=rust").await;
    assert_eq!(body["bookmarks"].as_array().map(Vec::len), Some(1));
    let (_, body) = get_json(&client, &server, &token, "/api/bookmarks?tag=rus").await;
    assert_eq!(body["bookmarks"].as_array().map(Vec::len), Some(0));

    let (_, body) = get_json(&client, &server, &token, "/api/tags").await;
    assert_eq!(body["tags"], serde_json::json!(["learning", "rust"]));

    // Delete
    let deleted = client
        .delete(server.url(&format!("/api/bookmarks/{id}")))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await
        .expect("delete should complete");
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: Value = deleted.json().await.expect("delete response should be json");
    assert_eq!(body["message"], "Bookmark deleted successfully");

    let again = client
        .delete(server.url(&format!("/api/bookmarks/{id}")))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await
        .expect("delete should complete");
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    let body: Value = again.json().await.expect("error should be json");
    assert_eq!(body["error"], "Bookmark not found");

    let (status, _) = get_json(&client, &server, &token, &format!("/api/bookmarks/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_urls_are_rejected_before_fetching() {
    let reader = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(READER_DOCUMENT))
        .expect(0)
        .mount(&reader)
        .await;
    let server = GatewayTestServer::start(&reader.uri()).await;
    let client = reqwest::Client::new();
    let token = server.login(&client).await;

    for bad in ["not a url", "ftp://example.com/file", "example.com"] {
        let response = create(&client, &server, &token, serde_json::json!({"url": bad})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad}");
        let body: Value = response.json().await.expect("error should be json");
        assert_eq!(body["error"], "Please enter a valid URL");
    }
}

#[tokio::test]
async fn unreachable_page_and_reader_still_save_with_fallbacks() {
    let page = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&page)
        .await;
    let reader = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&reader)
        .await;

    let server = GatewayTestServer::start(&reader.uri()).await;
    let client = reqwest::Client::new();
    let token = server.login(&client).await;

    let response = create(
        &client,
        &server,
        &token,
        serde_json::json!({"url": format!("{}/gone", page.uri())}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("create response should be json");
    let bookmark = &body["bookmark"];
    assert_eq!(bookmark["title"], "127.0.0.1");
    assert_eq!(bookmark["favicon"], format!("{}/favicon.ico", page.uri()));
    assert_eq!(bookmark["summary"], SUMMARY_UNAVAILABLE);
    assert_eq!(bookmark["full_content"], "");
    assert!(bookmark["description"].is_null());
}
