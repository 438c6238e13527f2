//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small sites and run discovery through
//! the real HTTP loader.

mod common;

use site2pdf::config::CrawlerConfig;
use site2pdf::crawler::{Crawler, HttpLoader};
use site2pdf::{Phase, ProgressEvent};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

fn http_crawler() -> Crawler<HttpLoader> {
    let config = CrawlerConfig {
        page_load_timeout_secs: 5,
        ..CrawlerConfig::default()
    };
    Crawler::new(HttpLoader::new(&config).unwrap(), &config)
}

async fn crawl(server: &MockServer, budget: usize) -> (Vec<String>, Vec<ProgressEvent>) {
    let mut events = Vec::new();
    let urls = http_crawler()
        .crawl(&format!("{}/", server.uri()), budget, |e| events.push(e))
        .await
        .expect("crawl should succeed");

    let base = server.uri();
    let paths = urls
        .iter()
        .map(|u| u.as_str().trim_start_matches(base.as_str()).to_string())
        .collect();
    (paths, events)
}

#[tokio::test]
async fn test_budget_and_cross_origin_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a>
           <a href="https://other.test/x">Elsewhere</a>
           <a href="/contact">Contact</a>"#,
    )
    .await;
    mount_page(&server, "/about", "about").await;
    mount_page(&server, "/contact", "contact").await;

    let (paths, events) = crawl(&server, 2).await;

    assert_eq!(paths, vec!["/", "/about"]);

    let last = events.last().unwrap();
    assert_eq!(last.phase, Phase::Completed);
    assert_eq!((last.current, last.total), (2, 2));
    assert_eq!(last.message, "Crawling completed. Found 2 pages.");
    assert!(events.iter().all(|e| !e.current_url.contains("other.test")));
}

#[tokio::test]
async fn test_unreachable_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#).await;
    mount_page(&server, "/a", "a").await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/c", "c").await;

    let (paths, events) = crawl(&server, 10).await;

    assert_eq!(paths, vec!["/", "/a", "/c"]);
    let skipped: Vec<&ProgressEvent> = events
        .iter()
        .filter(|e| e.message.starts_with("Skipped:"))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].current_url.ends_with("/b"));
    assert!(skipped[0].message.ends_with("HTTP 500"));
}

#[tokio::test]
async fn test_non_html_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/report.pdf">Report</a><a href="/a">A</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.5".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/a", "a").await;

    let (paths, _) = crawl(&server, 10).await;

    assert_eq!(paths, vec!["/", "/a"]);
}

#[tokio::test]
async fn test_budget_caps_visited_pages() {
    let server = MockServer::start().await;
    let links: String = (1..=5)
        .map(|n| format!(r#"<a href="/p{}">{}</a>"#, n, n))
        .collect();
    mount_page(&server, "/", &links).await;
    Mock::given(method("GET"))
        .respond_with(html_page("leaf"))
        .mount(&server)
        .await;

    let (paths, _) = crawl(&server, 3).await;

    assert_eq!(paths, vec!["/", "/p1", "/p2"]);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_per_page_link_cap() {
    let server = MockServer::start().await;
    let links: String = (0..25)
        .map(|n| format!(r#"<a href="/p{}">{}</a>"#, n, n))
        .collect();
    mount_page(&server, "/", &links).await;
    Mock::given(method("GET"))
        .respond_with(html_page("leaf"))
        .mount(&server)
        .await;

    let (paths, _) = crawl(&server, 100).await;

    assert_eq!(paths.len(), 21);
    assert_eq!(paths.last().unwrap(), "/p19");
    assert!(!paths.iter().any(|p| p == "/p20"));
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a1">A1</a><a href="/">Home</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/b1">B1</a><a href="/a">A</a>"#).await;
    mount_page(&server, "/a1", "a1").await;
    mount_page(&server, "/b1", "b1").await;

    let (paths, events) = crawl(&server, 10).await;

    assert_eq!(paths, vec!["/", "/a", "/b", "/a1", "/b1"]);

    let counters: Vec<usize> = events
        .iter()
        .filter(|e| e.phase == Phase::Crawling)
        .map(|e| e.current)
        .collect();
    assert_eq!(counters, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/docs/", server.uri())),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/docs/", r#"<a href="intro">Intro</a>"#).await;
    mount_page(&server, "/docs/intro", "intro").await;

    let (paths, _) = crawl(&server, 10).await;

    assert_eq!(paths, vec!["/", "/old", "/docs/intro"]);
}

#[tokio::test]
async fn test_fake_loader_drives_same_crawl() {
    let loader = common::StaticLoader::new()
        .page("https://example.test/", r#"<a href="/x">x</a><a href="https://other.test/">o</a>"#)
        .page("https://example.test/x", "");
    let crawler = Crawler::new(loader, &CrawlerConfig::default());

    let urls = crawler
        .crawl("https://example.test/", 10, |_| {})
        .await
        .unwrap();

    let urls: Vec<String> = urls.into_iter().map(String::from).collect();
    assert_eq!(urls, vec!["https://example.test/", "https://example.test/x"]);
}
