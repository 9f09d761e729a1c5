//! HTTP fetcher tests against a wiremock server

use rankcrawl::config::{CrawlConfig, Patterns, UserAgentSettings};
use rankcrawl::crawler::{build_http_client, run_crawl, Crawler, FetchError, HttpFetcher, PageFetcher};
use rankcrawl::output::{open_append, RunStatus};
use rankcrawl::storage::{SqliteStore, SITES_NAMESPACE};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHOP_PAGE: &str = r#"<html lang="de">
<head>
    <title>Kaufhaus</title>
    <meta name="description" content="Alles im Angebot">
</head>
<body><button class="add-to-cart">Kaufen</button></body>
</html>"#;

fn create_fetcher() -> HttpFetcher {
    let client = build_http_client(&UserAgentSettings::default(), Duration::from_secs(5))
        .expect("Failed to build client");
    HttpFetcher::new(client)
}

/// Returns the mock server address as a bare `host:port` domain
fn bare_domain(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse base URL");
    format!(
        "{}:{}",
        url.host_str().expect("Failed to extract host"),
        url.port().expect("Failed to extract port")
    )
}

#[tokio::test]
async fn test_fetch_extracts_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", UserAgentSettings::default().header_value().as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SHOP_PAGE)
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let domain = bare_domain(&mock_server);
    let page = create_fetcher()
        .fetch(&domain, Duration::from_secs(5))
        .await
        .expect("Fetch failed");

    assert_eq!(page.url, format!("http://{}/", domain));
    assert_eq!(page.title, "Kaufhaus");
    assert_eq!(page.description, "Alles im Angebot");
    assert_eq!(page.language, "de");
    assert_eq!(page.body, SHOP_PAGE.as_bytes());
}

#[tokio::test]
async fn test_fetch_reports_final_url_after_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/home"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOP_PAGE))
        .mount(&mock_server)
        .await;

    let domain = bare_domain(&mock_server);
    let page = create_fetcher()
        .fetch(&domain, Duration::from_secs(5))
        .await
        .expect("Fetch failed");

    assert_eq!(page.url, format!("http://{}/home", domain));
}

#[tokio::test]
async fn test_fetch_server_error_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = create_fetcher()
        .fetch(&bare_domain(&mock_server), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SHOP_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let result = create_fetcher()
        .fetch(&bare_domain(&mock_server), Duration::from_millis(200))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_full_crawl_against_mock_server() {
    let shop = MockServer::start().await;
    let blog = MockServer::start().await;
    let broken = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHOP_PAGE))
        .mount(&shop)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>wp-content</p>"))
        .mount(&blog)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let dir = TempDir::new().unwrap();
    let mut store = SqliteStore::open(&dir.path().join("sites.db")).unwrap();
    let csv = format!(
        "1,{}\n2,{}\n3,{}\n",
        bare_domain(&shop),
        bare_domain(&blog),
        bare_domain(&broken)
    );
    store
        .import_ranks(SITES_NAMESPACE, csv.as_bytes())
        .expect("Failed to import ranks");

    let patterns: Patterns = [("shop", "add-to-cart")].into_iter().collect();
    let crawler = Crawler::new(store, CrawlConfig::new(3, patterns), Arc::new(create_fetcher()));

    let out_path = dir.path().join("crawled.txt");
    let summary = run_crawl(
        &crawler,
        0,
        open_append(&out_path).unwrap(),
        std::future::pending::<()>(),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.no_match, 1);
    assert_eq!(summary.errors, 1);

    let output = std::fs::read_to_string(&out_path).unwrap();
    assert!(output.starts_with(&format!("URL: http://{}/\n", bare_domain(&shop))));
    assert!(output.contains("Patterns: shop\n"));
    assert!(output.contains("Title: Kaufhaus\n"));
    assert!(output.contains("Language: DE\n"));
}
