//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use doc_harvest::config::Config;
use doc_harvest::crawler::{build_http_client, Coordinator, Downloader};
use doc_harvest::output::CrawlSummary;
use doc_harvest::HarvestError;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration crawling `start_url` into `out_dir`
fn create_test_config(start_url: String, out_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = start_url;
    config.crawler.delay_secs = 0.0;
    config.crawler.timeout_secs = 5;
    config.retry.backoff_factor = 0.01;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.user_agent.contact_url = "https://example.com/contact".to_string();
    config.output.directory = out_dir.to_string_lossy().into_owned();
    config
}

/// An HTML page linking to each of `hrefs`
fn html_page(hrefs: &[&str]) -> ResponseTemplate {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            anchors
        ))
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// A PDF response with the given body
fn pdf(body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(body.to_vec())
        .insert_header("content-type", "application/pdf")
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

async fn crawl(config: Config) -> CrawlSummary {
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    coordinator.run().await.expect("Crawl failed")
}

#[tokio::test]
async fn test_end_to_end_same_path() {
    let mock_server = MockServer::start().await;
    let external = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    // Nothing on the external host may ever be requested
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&external)
        .await;

    let external_link = format!("{}/ref/x.pdf", external.uri());
    mount_get(
        &mock_server,
        "/ref/",
        html_page(&["/ref/a.pdf", "/ref/page2", &external_link]),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/page2", html_page(&["b.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4 a"), 1).await;
    mount_get(&mock_server, "/ref/b.pdf", pdf(b"%PDF-1.4 b"), 1).await;

    let config = create_test_config(format!("{}/ref/", base_url), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.links_checked, 4);
    assert_eq!(summary.documents_found, 2);
    assert_eq!(summary.documents_downloaded, 2);
    assert_eq!(summary.page_failures, 0);
    assert_eq!(summary.download_failures, 0);

    assert_eq!(
        std::fs::read(out.path().join("a.pdf")).unwrap(),
        b"%PDF-1.4 a"
    );
    assert_eq!(
        std::fs::read(out.path().join("b.pdf")).unwrap(),
        b"%PDF-1.4 b"
    );

    let preview: Vec<String> = summary.preview.iter().map(|u| u.path().to_string()).collect();
    assert_eq!(preview, vec!["/ref/a.pdf", "/ref/b.pdf"]);
}

#[tokio::test]
async fn test_link_cycle_visits_each_page_once() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/b"]), 1).await;
    mount_get(&mock_server, "/ref/b", html_page(&["/ref/", "/ref/b#top"]), 1).await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.crawler.max_depth = 5;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.documents_found, 0);
}

#[tokio::test]
async fn test_document_linked_from_multiple_depths_downloaded_once() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf", "/ref/p2"]), 1).await;
    mount_get(&mock_server, "/ref/p2", html_page(&["/ref/a.pdf", "/ref/p3"]), 1).await;
    mount_get(&mock_server, "/ref/p3", html_page(&["/ref/a.pdf#page=2"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.documents_downloaded, 1);
    assert!(!out.path().join("a (1).pdf").exists());
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf", "/ref/p2"]), 1).await;
    mount_get(&mock_server, "/ref/p2", html_page(&["/ref/b.pdf"]), 0).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;
    mount_get(&mock_server, "/ref/b.pdf", pdf(b"%PDF-1.4"), 0).await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.crawler.max_depth = 0;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.documents_downloaded, 1);
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /ref/private\n"),
        1,
    )
    .await;
    mount_get(
        &mock_server,
        "/ref/",
        html_page(&["/ref/a.pdf", "/ref/private/page", "/ref/private/c.pdf"]),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;
    mount_get(&mock_server, "/ref/private/page", html_page(&[]), 0).await;
    mount_get(&mock_server, "/ref/private/c.pdf", pdf(b"%PDF-1.4"), 0).await;

    // Disallowed URLs are never probed either
    Mock::given(method("HEAD"))
        .and(path("/ref/private/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.documents_downloaded, 1);
    assert_eq!(summary.policy_denials, 2);
    assert!(!out.path().join("c.pdf").exists());
}

#[tokio::test]
async fn test_robots_disallow_seed() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: TestBot\nDisallow: /\n"),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 0).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 0);
    assert_eq!(summary.documents_found, 0);
    assert_eq!(summary.policy_denials, 1);
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Two 503s first, then the real page
    Mock::given(method("GET"))
        .and(path("/ref/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.page_failures, 0);
    assert_eq!(summary.documents_downloaded, 1);
}

#[tokio::test]
async fn test_retries_exhausted_is_page_failure() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/ref/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.retry.max_attempts = 3;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.page_failures, 1);
    assert_eq!(summary.documents_found, 0);
}

#[tokio::test]
async fn test_content_type_probe_detects_document() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/download?id=7"]), 1).await;
    Mock::given(method("HEAD"))
        .and(path("/ref/download"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_get(&mock_server, "/ref/download", pdf(b"%PDF-1.7 probed"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.documents_downloaded, 1);
    assert_eq!(
        std::fs::read(out.path().join("download")).unwrap(),
        b"%PDF-1.7 probed"
    );
}

#[tokio::test]
async fn test_same_filename_gets_disambiguated() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(
        &mock_server,
        "/ref/",
        html_page(&["/ref/one/a.pdf", "/ref/two/a.pdf"]),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/one/a.pdf", pdf(b"first"), 1).await;
    mount_get(&mock_server, "/ref/two/a.pdf", pdf(b"second"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.documents_downloaded, 2);

    // Link order is unspecified, so either body may have claimed the plain name
    let mut contents = vec![
        std::fs::read(out.path().join("a.pdf")).unwrap(),
        std::fs::read(out.path().join("a (1).pdf")).unwrap(),
    ];
    contents.sort();
    assert_eq!(contents, vec![b"first".to_vec(), b"second".to_vec()]);
}

#[tokio::test]
async fn test_existing_file_not_overwritten() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("a.pdf"), b"already here").unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"new"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.documents_downloaded, 1);
    assert_eq!(
        std::fs::read(out.path().join("a.pdf")).unwrap(),
        b"already here"
    );
    assert_eq!(std::fs::read(out.path().join("a (1).pdf")).unwrap(), b"new");
    assert_eq!(summary.downloads[0].local_path, out.path().join("a (1).pdf"));
}

#[tokio::test]
async fn test_failed_download_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(
        &mock_server,
        "/ref/",
        html_page(&["/ref/missing.pdf", "/ref/p2"]),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/missing.pdf", ResponseTemplate::new(404), 1).await;
    mount_get(&mock_server, "/ref/p2", html_page(&["/ref/b.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/b.pdf", pdf(b"%PDF-1.4"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.documents_found, 2);
    assert_eq!(summary.documents_downloaded, 1);
    assert_eq!(summary.download_failures, 1);
    assert!(!out.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn test_all_paths_follows_siblings() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/other/page"]), 1).await;
    mount_get(&mock_server, "/other/page", html_page(&["/other/c.pdf"]), 1).await;
    mount_get(&mock_server, "/other/c.pdf", pdf(b"%PDF-1.4"), 1).await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.crawler.same_path_only = false;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.documents_downloaded, 1);
}

#[tokio::test]
async fn test_same_path_only_skips_siblings() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/other/page", "/reference/x.pdf"]), 1).await;
    mount_get(&mock_server, "/other/page", html_page(&[]), 0).await;
    mount_get(&mock_server, "/reference/x.pdf", pdf(b"%PDF-1.4"), 0).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.links_checked, 2);
    assert_eq!(summary.documents_found, 0);
}

#[tokio::test]
async fn test_seed_fragment_ignored() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/", "/ref/a.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;

    let config = create_test_config(format!("{}/ref/#main", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_downloaded, 1);
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // 500 is retryable, so every attempt is spent
    mount_get(&mock_server, "/robots.txt", ResponseTemplate::new(500), 5).await;
    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;

    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_downloaded, 1);
    assert_eq!(summary.policy_denials, 0);
}

#[tokio::test]
async fn test_robots_server_error_fails_closed() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/robots.txt", ResponseTemplate::new(500), 5).await;
    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 0).await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.robots.fail_open = false;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 0);
    assert_eq!(summary.documents_found, 0);
    assert_eq!(summary.policy_denials, 1);
}

#[tokio::test]
async fn test_crawl_delay_paces_requests() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1\n"),
        1,
    )
    .await;
    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 1).await;
    mount_get(&mock_server, "/ref/a.pdf", pdf(b"%PDF-1.4"), 1).await;

    // Configured delay is zero; the site's Crawl-delay wins
    let config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    let started = Instant::now();
    let summary = crawl(config).await;

    // One pause after the page fetch, one after the download
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_downloaded, 1);
}

#[tokio::test]
async fn test_download_timeout_is_retried() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_get(&mock_server, "/ref/", html_page(&["/ref/a.pdf"]), 1).await;
    mount_get(
        &mock_server,
        "/ref/a.pdf",
        pdf(b"%PDF-1.4").set_delay(Duration::from_secs(3)),
        2,
    )
    .await;

    let mut config = create_test_config(format!("{}/ref/", mock_server.uri()), out.path());
    config.crawler.timeout_secs = 1;
    config.retry.max_attempts = 2;
    let summary = crawl(config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.documents_downloaded, 0);
    assert_eq!(summary.download_failures, 1);
    assert!(!out.path().join("a.pdf").exists());
}

#[tokio::test]
async fn test_stalled_download_keeps_partial_file() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let out = TempDir::new().unwrap();

    // Announces 100 bytes, sends 10, then stalls
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 100\r\n\r\n",
            )
            .await
            .unwrap();
        socket.write_all(b"%PDF-1.4 x").await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let mut config = create_test_config(format!("http://{}/ref/", addr), out.path());
    config.crawler.timeout_secs = 1;
    let client = build_http_client(&config).unwrap();
    let downloader = Downloader::new(out.path(), ".pdf");
    let url = Url::parse(&format!("http://{}/ref/a.pdf", addr)).unwrap();

    let result = downloader.download(&client, &url).await;
    server.abort();

    assert!(matches!(result, Err(HarvestError::Timeout { .. })));
    assert_eq!(
        std::fs::read(out.path().join("a.pdf")).unwrap(),
        b"%PDF-1.4 x"
    );
}
