//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! through the real reqwest transport.

use std::time::Duration;
use sumi_sweep::config::{config_fingerprint, read_config, Config, CrawlerConfig};
use sumi_sweep::crawler::{crawl, Scheduler};
use sumi_sweep::output::write_report;
use sumi_sweep::SweepError;
use tokio::sync::mpsc;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration seeded at `seed_url`
fn create_test_config(seed_url: &str, workers: usize) -> CrawlerConfig {
    CrawlerConfig {
        seed_url: seed_url.to_string(),
        max_workers: workers,
        max_retries: 2,
        min_delay: 0.0,
        max_delay: 0.005,
        delay_floor: 0.001,
        request_timeout: 5.0,
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            r#"<html><head><title>{}</title>
            <meta name="description" content="About {}"></head>
            <body>{}</body></html>"#,
            title, title, body
        ))
        .insert_header("content-type", "text/html")
}

/// Mounts the four-page site: A links to B and C, B links off-domain and
/// back to A, C always fails
async fn mount_small_site(mock_server: &MockServer, c_attempts: u64) {
    let off_domain = mock_server.uri().replace("127.0.0.1", "localhost");

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("user-agent"))
        .respond_with(html_page(
            "Page A",
            r#"<p>Welcome</p><a href="/b">B</a> <a href="/c">C</a>"#,
        ))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(
            "Page B",
            &format!(r#"<a href="{}/d">D</a> <a href="/">A</a>"#, off_domain),
        ))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(500))
        .expect(c_attempts)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(html_page("Page D", "elsewhere"))
        .expect(0)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server, 2).await;

    let seed = format!("{}/", mock_server.uri());
    let config = create_test_config(&seed, 4);

    let outcome = crawl(&config).await.expect("Crawl should start");

    let page_a = format!("{}/", mock_server.uri());
    let page_b = format!("{}/b", mock_server.uri());
    let page_c = format!("{}/c", mock_server.uri());

    assert_eq!(outcome.results.len(), 2);
    let a = outcome.results.get(&page_a).expect("A should be scraped");
    assert_eq!(a.title.as_deref(), Some("Page A"));
    assert_eq!(a.meta_description.as_deref(), Some("About Page A"));
    assert!(a.text.contains("Welcome"));
    assert!(outcome.results.contains_key(&page_b));
    assert!(!outcome.results.contains_key(&page_c));

    assert_eq!(outcome.visited.len(), 3);
    assert_eq!(outcome.visited[0], page_a);
    assert!(outcome.visited.contains(&page_c));

    assert_eq!(outcome.stats.total_pages_scraped, 2);
    assert_eq!(outcome.stats.total_urls_processed, 3);
    assert_eq!(outcome.stats.failed_urls, 1);
    assert!((outcome.stats.success_rate - 66.666).abs() < 0.1);
    assert!(!outcome.stats.cancelled);
}

#[tokio::test]
async fn test_crawl_with_single_worker_is_fifo() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Root",
            r#"<a href="/one">1</a><a href="/two">2</a><a href="/three">3</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page("One", r#"<a href="/one/deep">deep</a>"#))
        .mount(&mock_server)
        .await;
    for page in ["/two", "/three", "/one/deep"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(page, "leaf"))
            .mount(&mock_server)
            .await;
    }

    let base = mock_server.uri();
    let config = create_test_config(&format!("{}/", base), 1);
    let outcome = crawl(&config).await.expect("Crawl should start");

    // Links are discovered in sorted order and dispatched layer by layer
    let expected: Vec<String> = ["/", "/one", "/three", "/two", "/one/deep"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    assert_eq!(outcome.visited, expected);
    assert_eq!(outcome.stats.max_depth, 2);
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let mock_server = MockServer::start().await;

    // First attempt fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Recovered", "ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 1);
    let outcome = crawl(&config).await.expect("Crawl should start");

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.stats.failed_urls, 0);
}

#[tokio::test]
async fn test_progress_events_are_streamed() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server, 2).await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 2);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(&config)
        .expect("Scheduler should build")
        .with_progress(tx);

    let outcome = scheduler.run().await;
    drop(scheduler);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 3);
    assert_eq!(events.iter().filter(|e| e.succeeded).count(), 2);
    assert!(events.windows(2).all(|w| w[0].estimate <= w[1].estimate));
    assert_eq!(events.last().unwrap().completed, 3);
    assert_eq!(outcome.stats.final_estimate, events.last().unwrap().estimate);
}

#[tokio::test]
async fn test_cancellation_returns_partial_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Root", r#"<a href="/slow">slow</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("Slow", "late").set_delay(Duration::from_secs(20)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 2);
    let scheduler = Scheduler::new(&config).expect("Scheduler should build");
    let token = scheduler.cancellation_token();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(10), scheduler.run())
        .await
        .expect("Cancelled crawl should stop promptly");
    canceller.await.unwrap();

    assert!(outcome.stats.cancelled);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.visited.len(), 2);
}

#[tokio::test]
async fn test_report_written_to_file() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server, 2).await;

    let config = Config {
        crawler: create_test_config(&format!("{}/", mock_server.uri()), 2),
        ..Config::default()
    };
    let fingerprint = config_fingerprint(&config).expect("Fingerprint should compute");

    let scheduler = Scheduler::new(&config.crawler)
        .expect("Scheduler should build")
        .with_fingerprint(fingerprint.clone());
    let outcome = scheduler.run().await;

    let temp_dir = tempfile::tempdir().unwrap();
    let report_path = temp_dir.path().join("nested").join("report.json");
    write_report(&outcome.into_report(), Some(&report_path)).expect("Report should be written");

    let contents = std::fs::read_to_string(&report_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();

    let data = json["data"].as_object().expect("data should be an object");
    assert_eq!(data.len(), 2);
    let page_a = &data[&format!("{}/", mock_server.uri())];
    assert_eq!(page_a["title"], "Page A");
    assert_eq!(page_a["meta_description"], "About Page A");

    let stats = &json["stats"];
    assert_eq!(stats["total_pages_scraped"], 2);
    assert_eq!(stats["total_urls_processed"], 3);
    assert_eq!(stats["failed_urls"], 1);
    assert_eq!(stats["cancelled"], false);
    assert_eq!(stats["config_fingerprint"], fingerprint.as_str());
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Only", "single page"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("sweep.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
seed-url = "{}/"
max-workers = 2
max-retries = 1
min-delay = 0.0
max-delay = 0.01
delay-floor = 0.001
"#,
            mock_server.uri()
        ),
    )
    .unwrap();

    let config = read_config(&config_path).expect("Config should parse");
    let outcome = crawl(&config.crawler).await.expect("Crawl should start");

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.stats.success_rate, 100.0);
}

#[tokio::test]
async fn test_invalid_seed_fails_before_crawling() {
    let config = create_test_config("ftp://example.com/", 1);
    let result = crawl(&config).await;
    assert!(matches!(result, Err(SweepError::Config(_))));

    let config = create_test_config("", 1);
    let result = crawl(&config).await;
    assert!(matches!(result, Err(SweepError::Config(_))));
}
