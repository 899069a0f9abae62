//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run complete
//! crawls end-to-end, from input lines to crawl records and CSV rows.

use futures::stream;
use logo_scout::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use logo_scout::crawler::crawl;
use logo_scout::output::{CsvEmitter, ResultEmitter};
use logo_scout::{CrawlRecord, FailureKind, MetricsSnapshot, Outcome, Strategy};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and no throttle
fn create_test_config(concurrency_limit: u32, inter_request_delay_ms: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency_limit,
            inter_request_delay_ms,
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            max_redirects: 3,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: None,
        },
        output: OutputConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Host and port of the mock server, as a bare domain line
fn bare_host(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

async fn run_crawl(config: &Config, lines: Vec<String>) -> (Vec<CrawlRecord>, MetricsSnapshot) {
    let mut records: Vec<CrawlRecord> = Vec::new();
    let snapshot = crawl(
        config,
        stream::iter(lines),
        &mut records,
        CancellationToken::new(),
    )
    .await
    .expect("Crawl failed");
    (records, snapshot)
}

async fn crawl_one(config: &Config, line: String) -> CrawlRecord {
    let (mut records, _) = run_crawl(config, vec![line]).await;
    assert_eq!(records.len(), 1);
    records.remove(0)
}

fn csv_rows(records: &[CrawlRecord], annotate: bool) -> String {
    let mut emitter = CsvEmitter::new(Vec::new(), annotate).expect("Failed to create emitter");
    for record in records {
        emitter.emit(record).expect("Failed to emit");
    }
    emitter.finish().expect("Failed to finish");
    String::from_utf8(emitter.into_inner().expect("Failed to flush")).expect("CSV is UTF-8")
}

#[tokio::test]
async fn test_icon_named_logo_fills_both_fields() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><link rel="icon" href="/logo.png"></head></html>"#,
    )
    .await;

    let config = create_test_config(2, 0);
    let line = server.uri();
    let record = crawl_one(&config, line.clone()).await;

    let expected = format!("{}/logo.png", server.uri());
    assert_eq!(record.logo_url.as_ref().map(|u| u.as_str()), Some(expected.as_str()));
    assert_eq!(record.favicon_url.as_ref().map(|u| u.as_str()), Some(expected.as_str()));
    assert_eq!(record.outcome, Outcome::LogoFound(Strategy::LogoTag));

    assert_eq!(
        csv_rows(&[record], false),
        format!("domain,logo_url,favicon_url\n{},{},{}\n", line, expected, expected)
    );
}

#[tokio::test]
async fn test_page_without_logo_is_not_a_failure() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<html><body><p>Just some text content</p></body></html>",
    )
    .await;

    let config = create_test_config(2, 0);
    let (records, snapshot) = run_crawl(&config, vec![server.uri()]).await;

    assert_eq!(records[0].outcome, Outcome::NoLogo);
    assert!(records[0].favicon_url.is_none());
    assert_eq!(snapshot.no_logo, 1);
    assert_eq!(snapshot.failures_total(), 0);
    assert_eq!(snapshot.favicon_missing, 1);
    assert_eq!(
        csv_rows(&records, false),
        format!("domain,logo_url,favicon_url\n{},,\n", server.uri())
    );
}

#[tokio::test]
async fn test_http_error_status_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(2, 0);
    let (records, snapshot) = run_crawl(&config, vec![server.uri()]).await;

    assert_eq!(records[0].failure_kind(), Some(FailureKind::HttpError(404)));
    assert_eq!(snapshot.failures_of(FailureKind::HttpError(404)), 1);
    assert_eq!(
        csv_rows(&records, true),
        format!(
            "domain,logo_url,favicon_url,failure\n{},,,http_error_404\n",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_redirect_loop_is_too_many_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .mount(&server)
        .await;

    let config = create_test_config(2, 0);
    let record = crawl_one(&config, server.uri()).await;
    assert_eq!(record.failure_kind(), Some(FailureKind::TooManyRedirects));
}

#[tokio::test]
async fn test_references_resolve_against_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/en/"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/en/",
        r#"<html><body><header><img class="logo" src="img/brand.svg"></header></body></html>"#,
    )
    .await;

    let config = create_test_config(2, 0);
    let record = crawl_one(&config, server.uri()).await;

    assert_eq!(
        record.logo_url.map(|u| u.to_string()),
        Some(format!("{}/en/img/brand.svg", server.uri()))
    );
    assert_eq!(record.outcome, Outcome::LogoFound(Strategy::ImageHeuristic));
}

#[tokio::test]
async fn test_manifest_icons_fill_favicon() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head>
             <meta property="og:image" content="/social.png">
             <link rel="manifest" href="/static/site.webmanifest">
           </head></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/static/site.webmanifest"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/manifest+json")
                .set_body_string(
                    r#"{"icons": [
                         {"src": "icons/192.png", "sizes": "192x192"},
                         {"src": "icons/512.png", "sizes": "512x512"}
                       ]}"#,
                ),
        )
        .mount(&server)
        .await;

    let config = create_test_config(2, 0);
    let record = crawl_one(&config, server.uri()).await;

    assert_eq!(
        record.logo_url.map(|u| u.to_string()),
        Some(format!("{}/social.png", server.uri()))
    );
    assert_eq!(
        record.favicon_url.map(|u| u.to_string()),
        Some(format!("{}/static/icons/512.png", server.uri()))
    );
    assert_eq!(record.outcome, Outcome::LogoFound(Strategy::SocialImage));
}

#[tokio::test]
async fn test_manifest_icon_is_logo_of_last_resort() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><link rel="manifest" href="/manifest.json"></head></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"icons": [{"src": "/app-icon.png", "sizes": "256x256"}]}"#),
        )
        .mount(&server)
        .await;

    let config = create_test_config(2, 0);
    let record = crawl_one(&config, server.uri()).await;

    let icon = format!("{}/app-icon.png", server.uri());
    assert_eq!(record.logo_url.map(|u| u.to_string()), Some(icon.clone()));
    assert_eq!(record.favicon_url.map(|u| u.to_string()), Some(icon));
    assert_eq!(record.outcome, Outcome::LogoFound(Strategy::Favicon));
}

#[tokio::test]
async fn test_favicon_ico_probe_fills_favicon_only() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body>No markup icons</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/x-icon")
                .set_body_bytes(vec![0u8, 0, 1, 0, 1, 0]),
        )
        .mount(&server)
        .await;

    let config = create_test_config(2, 0);
    let (records, snapshot) = run_crawl(&config, vec![server.uri()]).await;

    assert_eq!(
        records[0].favicon_url.as_ref().map(|u| u.to_string()),
        Some(format!("{}/favicon.ico", server.uri()))
    );
    assert!(records[0].logo_url.is_none());
    assert_eq!(records[0].outcome, Outcome::NoLogo);
    assert_eq!(snapshot.favicon_found, 1);
}

#[tokio::test]
async fn test_html_favicon_probe_is_ignored() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body>Home</body></html>").await;
    mount_page(&server, "/favicon.ico", "<html><body>Not found</body></html>").await;

    let config = create_test_config(2, 0);
    let record = crawl_one(&config, server.uri()).await;
    assert!(record.favicon_url.is_none());
}

#[tokio::test]
async fn test_bare_domain_falls_back_to_http() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><meta itemprop="logo" content="/mark.svg"></head></html>"#,
    )
    .await;

    let config = create_test_config(2, 0);
    let line = bare_host(&server);
    let record = crawl_one(&config, line.clone()).await;

    assert_eq!(record.domain, line);
    assert_eq!(
        record.logo_url.map(|u| u.to_string()),
        Some(format!("http://{}/mark.svg", line))
    );
}

#[tokio::test]
async fn test_timeout_on_both_schemes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let healthy = MockServer::start().await;
    mount_page(&healthy, "/", "<html></html>").await;

    let config = create_test_config(2, 0);
    let slow = bare_host(&server);
    let (records, snapshot) = run_crawl(&config, vec![slow.clone(), healthy.uri()]).await;

    assert_eq!(records.len(), 2);
    let failed = records
        .iter()
        .find(|r| r.domain == slow)
        .expect("Missing record for the slow domain");
    assert_eq!(failed.failure_kind(), Some(FailureKind::Timeout));
    assert_eq!(snapshot.failures_of(FailureKind::Timeout), 1);
    let rows = csv_rows(&[failed.clone()], false);
    assert_eq!(rows.lines().nth(1), Some(format!("{},,", slow).as_str()));

    let other = records
        .iter()
        .find(|r| r.domain == healthy.uri())
        .expect("Missing record for the healthy domain");
    assert_eq!(other.outcome, Outcome::NoLogo);
}

#[tokio::test]
async fn test_user_agent_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(html(r#"<meta property="og:image" content="/og.png">"#))
        .mount(&server)
        .await;

    let config = create_test_config(1, 0);
    let record = crawl_one(&config, server.uri()).await;
    assert_eq!(record.outcome, Outcome::LogoFound(Strategy::SocialImage));
}

#[tokio::test]
async fn test_one_record_per_input_line() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><link rel="logo" href="/logo.svg"></head></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(4, 0);
    let lines = vec![
        server.uri(),
        server.uri(),
        format!("{}/missing", server.uri()),
        "ftp://example.com".to_string(),
        "http://".to_string(),
        server.uri(),
    ];
    let (records, snapshot) = run_crawl(&config, lines.clone()).await;

    assert_eq!(records.len(), lines.len());
    let mut got: Vec<&str> = records.iter().map(|r| r.domain.as_str()).collect();
    let mut want: Vec<&str> = lines.iter().map(String::as_str).collect();
    got.sort_unstable();
    want.sort_unstable();
    assert_eq!(got, want);

    assert_eq!(snapshot.dispatched, lines.len() as u64);
    assert_eq!(snapshot.outcomes_total(), snapshot.dispatched);
    assert_eq!(snapshot.hits(Strategy::LogoTag), 3);
    assert_eq!(snapshot.failures_of(FailureKind::InvalidUrl), 2);
    assert_eq!(snapshot.failures_of(FailureKind::HttpError(500)), 1);
}

#[tokio::test]
async fn test_in_flight_fetches_never_exceed_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let config = create_test_config(3, 0);
    let lines: Vec<String> = (0..12).map(|_| server.uri()).collect();
    let (records, snapshot) = run_crawl(&config, lines).await;

    assert_eq!(records.len(), 12);
    assert!(snapshot.peak_in_flight >= 1);
    assert!(
        snapshot.peak_in_flight <= 3,
        "Peak in-flight {} exceeded the limit",
        snapshot.peak_in_flight
    );
}

#[tokio::test]
async fn test_per_worker_politeness_delay() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html></html>").await;

    let config = create_test_config(1, 300);
    let lines: Vec<String> = (0..3).map(|_| server.uri()).collect();

    let started = Instant::now();
    let (records, _) = run_crawl(&config, lines).await;

    assert_eq!(records.len(), 3);
    assert!(
        started.elapsed() >= Duration::from_millis(600),
        "Three dispatches by one worker finished in {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_politeness_delay_is_not_shared_between_workers() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html></html>").await;

    let config = create_test_config(2, 300);
    let lines: Vec<String> = (0..4).map(|_| server.uri()).collect();

    let started = Instant::now();
    let (records, _) = run_crawl(&config, lines).await;
    let elapsed = started.elapsed();

    assert_eq!(records.len(), 4);
    // Each worker waits once; a single shared throttle would need three waits
    assert!(
        elapsed >= Duration::from_millis(300),
        "Second dispatches did not wait: {:?}",
        elapsed
    );
    assert!(
        elapsed < Duration::from_millis(800),
        "Workers throttled each other: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_cancellation_resolves_remaining_domains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let config = create_test_config(1, 0);
    let lines: Vec<String> = (0..5).map(|_| server.uri()).collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let mut records: Vec<CrawlRecord> = Vec::new();
    let snapshot = crawl(&config, stream::iter(lines), &mut records, cancel)
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 5);
    let cancelled = records
        .iter()
        .filter(|r| r.failure_kind() == Some(FailureKind::Cancelled))
        .count();
    assert_eq!(cancelled, 4, "The in-flight domain should finish normally");
    assert_eq!(snapshot.failures_of(FailureKind::Cancelled), 4);
    assert_eq!(snapshot.outcomes_total(), 5);
}
